//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on a random port and talk to it with a
//! `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use gambit_transport::{
        Connection, Transport, WebSocketConnection, WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds a transport on an OS-assigned port, connects one client and
    /// returns both ends.
    async fn connected_pair() -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr");

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let url = format!("ws://{addr}");
        let (client, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");
        (server_conn, client)
    }

    #[tokio::test]
    async fn test_websocket_send_and_receive_both_directions() {
        let (server_conn, mut client) = connected_pair().await;
        assert!(server_conn.id().get() > 0);

        server_conn
            .send(br#"{"command":"game-ready","data":{"yourTurn":true}}"#)
            .await
            .expect("send should succeed");

        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "JSON frames go out as text");
        assert_eq!(
            msg.into_text().unwrap().as_str(),
            r#"{"command":"game-ready","data":{"yourTurn":true}}"#
        );

        client
            .send(Message::Text(
                r#"{"command":"start-game"}"#.to_string().into(),
            ))
            .await
            .unwrap();

        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"command":"start-game"}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (server_conn, mut client) = connected_pair().await;

        client.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_send_not_blocked_by_pending_recv() {
        let (server_conn, mut client) = connected_pair().await;
        let server_conn = std::sync::Arc::new(server_conn);

        // Park a reader on the connection; nothing will arrive for it yet.
        let reader = {
            let conn = std::sync::Arc::clone(&server_conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        tokio::time::timeout(Duration::from_secs(1), server_conn.send(b"relay"))
            .await
            .expect("send must not wait for the reader")
            .expect("send should succeed");

        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"relay");

        client.send(Message::Close(None)).await.unwrap();
        let read = reader.await.unwrap().expect("recv should not error");
        assert!(read.is_none());
    }
}
