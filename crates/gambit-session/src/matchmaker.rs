//! The match-maker: pairs connections and tracks every live session.

use std::collections::HashMap;
use std::sync::Arc;

use gambit_protocol::{ClientCommand, Envelope};
use gambit_rules::RulesEngine;
use gambit_stats::StatsRecorder;
use gambit_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::{DestroyHook, PlayerHandle, Seat, Session, SessionId};

/// Produces candidate session ids. Collisions are retried.
pub type IdGenerator = Box<dyn FnMut() -> SessionId + Send>;

/// A destroyed session waiting to be unregistered.
#[derive(Debug)]
struct Reaped {
    id: SessionId,
    /// Set when the hook was installed while the session was pending.
    was_pending: bool,
}

/// Owns every live session and routes connection events to them.
///
/// At most one session is pending (awaiting an opponent) at a time: the
/// next `start-game` joins it. Sessions unregister themselves through
/// their destroy hook, which queues a notice that the match-maker
/// drains after each event. A destroyed session is therefore gone
/// before the next event is handled.
///
/// A game that was played to the end stays reachable for chat: its
/// players remain routed to it until they disconnect or start again.
pub struct MatchMaker<R: RulesEngine> {
    sessions: HashMap<SessionId, Session<R>>,
    /// Completed games whose players are still connected.
    finished: HashMap<SessionId, Session<R>>,
    pending: Option<SessionId>,
    /// Which session and seat each seated connection belongs to.
    routes: HashMap<ConnectionId, (SessionId, Seat)>,
    stats: Arc<dyn StatsRecorder>,
    next_id: IdGenerator,
    reaped_tx: mpsc::UnboundedSender<Reaped>,
    reaped_rx: mpsc::UnboundedReceiver<Reaped>,
}

impl<R: RulesEngine> MatchMaker<R> {
    /// Creates an empty match-maker with random session ids.
    pub fn new(stats: Arc<dyn StatsRecorder>) -> Self {
        Self::with_id_generator(stats, Box::new(SessionId::random))
    }

    /// Creates an empty match-maker that draws session ids from `next_id`.
    pub fn with_id_generator(
        stats: Arc<dyn StatsRecorder>,
        next_id: IdGenerator,
    ) -> Self {
        let (reaped_tx, reaped_rx) = mpsc::unbounded_channel();
        Self {
            sessions: HashMap::new(),
            finished: HashMap::new(),
            pending: None,
            routes: HashMap::new(),
            stats,
            next_id,
            reaped_tx,
            reaped_rx,
        }
    }

    /// Seats `player` in a game.
    ///
    /// Joins the pending session if there is one, which starts that
    /// game; otherwise opens a new session and makes it pending. A
    /// connection that is already seated in a live game stays where it
    /// is. One still attached to a finished game leaves it first.
    pub fn request_session(&mut self, player: PlayerHandle) -> SessionId {
        if let Some((id, seat)) = self.routes.get(&player.id()) {
            if self.sessions.contains_key(id) {
                tracing::debug!(
                    conn_id = %player.id(),
                    session_id = %id,
                    %seat,
                    "already seated"
                );
                return id.clone();
            }
            self.release(player.id());
        }

        if let Some(pending) = self.pending.take() {
            if let Some(id) = self.seat_second_player(pending, &player) {
                return id;
            }
        }
        self.open_session(player)
    }

    /// Handles a decoded frame from `player`.
    ///
    /// Seated connections are routed to their session. After game over
    /// the players can still chat, and `start-game` seats them in a new
    /// game. From anyone else, only `start-game` means something.
    pub fn handle_envelope(
        &mut self,
        player: &PlayerHandle,
        envelope: Envelope,
    ) {
        let route = self.routes.get(&player.id()).cloned();
        if let Some((id, seat)) = &route {
            if let Some(session) = self.sessions.get_mut(id) {
                session.handle_incoming_message(envelope, *seat);
                self.reap();
                return;
            }
        }

        match ClientCommand::from_envelope(envelope) {
            Ok(ClientCommand::StartGame) => {
                self.request_session(player.clone());
            }
            Ok(ClientCommand::Chat(data)) => {
                let Some((id, seat)) = route else {
                    tracing::debug!(
                        conn_id = %player.id(),
                        "not seated, chat ignored"
                    );
                    return;
                };
                if let Some(session) = self.finished.get_mut(&id) {
                    session.handle_chat(data, seat);
                }
            }
            Ok(other) => {
                tracing::debug!(
                    conn_id = %player.id(),
                    command = other.name(),
                    "not in a running game, ignored"
                );
            }
            Err(e) => {
                tracing::debug!(
                    conn_id = %player.id(),
                    error = %e,
                    "not in a running game, bad payload dropped"
                );
            }
        }
    }

    /// Handles connection `conn_id` going away.
    ///
    /// The owning session, if any, ends the game and is unregistered. A
    /// finished game is dropped once neither player is attached.
    pub fn handle_close(&mut self, conn_id: ConnectionId) {
        let Some((id, seat)) = self.routes.get(&conn_id).cloned() else {
            tracing::trace!(%conn_id, "closed connection was not seated");
            return;
        };
        if let Some(session) = self.sessions.get_mut(&id) {
            session.on_connection_closed(seat);
            self.reap();
        }
        self.release(conn_id);
    }

    /// The session awaiting an opponent, if any.
    pub fn pending_id(&self) -> Option<&SessionId> {
        self.pending.as_ref()
    }

    pub fn session(&self, id: &SessionId) -> Option<&Session<R>> {
        self.sessions.get(id)
    }

    /// Number of registered sessions, pending included.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of finished games that still have a player attached.
    pub fn finished_count(&self) -> usize {
        self.finished.len()
    }

    /// The live session and seat `conn_id` is routed to.
    pub fn seat_of(&self, conn_id: ConnectionId) -> Option<(&SessionId, Seat)> {
        self.routes
            .get(&conn_id)
            .filter(|(id, _)| self.sessions.contains_key(id))
            .map(|(id, seat)| (id, *seat))
    }

    fn open_session(&mut self, player: PlayerHandle) -> SessionId {
        let id = self.fresh_id();
        let conn_id = player.id();

        let mut session =
            Session::new(id.clone(), player, Arc::clone(&self.stats));
        session.set_destroy_hook(self.reaper(true));

        self.routes.insert(conn_id, (id.clone(), Seat::White));
        self.sessions.insert(id.clone(), session);
        self.pending = Some(id.clone());

        tracing::info!(
            session_id = %id,
            %conn_id,
            "session opened, awaiting opponent"
        );
        id
    }

    /// Joins `player` to the pending session `id`. Returns `None` if
    /// that session can't take them.
    fn seat_second_player(
        &mut self,
        id: SessionId,
        player: &PlayerHandle,
    ) -> Option<SessionId> {
        let hook = self.reaper(false);
        let Some(session) = self.sessions.get_mut(&id) else {
            tracing::warn!(
                session_id = %id,
                "pending session missing from registry"
            );
            return None;
        };
        if let Err(e) = session.join_second_player(player.clone()) {
            tracing::warn!(
                session_id = %id,
                error = %e,
                "pending session refused a player"
            );
            return None;
        }
        session.set_destroy_hook(hook);
        self.routes.insert(player.id(), (id.clone(), Seat::Black));
        Some(id)
    }

    fn fresh_id(&mut self) -> SessionId {
        loop {
            let id = (self.next_id)();
            if !self.sessions.contains_key(&id)
                && !self.finished.contains_key(&id)
            {
                return id;
            }
            tracing::debug!(session_id = %id, "session id collision, retrying");
        }
    }

    fn reaper(&self, was_pending: bool) -> DestroyHook {
        let tx = self.reaped_tx.clone();
        Box::new(move |id: &SessionId| {
            // The receiver lives as long as the match-maker.
            let _ = tx.send(Reaped {
                id: id.clone(),
                was_pending,
            });
        })
    }

    /// Unregisters every session destroyed since the last call.
    ///
    /// A game that was started keeps its routes and moves to `finished`.
    /// A lone player's session is dropped outright.
    fn reap(&mut self) {
        while let Ok(Reaped { id, was_pending }) = self.reaped_rx.try_recv() {
            if was_pending && self.pending.as_ref() == Some(&id) {
                self.pending = None;
            }
            let Some(session) = self.sessions.remove(&id) else {
                continue;
            };
            tracing::info!(
                session_id = %id,
                turns = session.turn_index(),
                sessions = self.sessions.len(),
                "session unregistered"
            );
            if session.player(Seat::Black).is_some() {
                self.finished.insert(id, session);
            } else if let Some(white) = session.player(Seat::White) {
                self.routes.remove(&white.id());
            }
        }
    }

    /// Detaches `conn_id` from its session. A finished game with no
    /// player left attached is dropped.
    fn release(&mut self, conn_id: ConnectionId) {
        let Some((id, _)) = self.routes.remove(&conn_id) else {
            return;
        };
        if !self.finished.contains_key(&id) {
            return;
        }
        if self.routes.values().any(|(other, _)| *other == id) {
            return;
        }
        self.finished.remove(&id);
        tracing::debug!(session_id = %id, "finished session released");
    }
}

impl<R: RulesEngine> std::fmt::Debug for MatchMaker<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchMaker")
            .field("sessions", &self.sessions.len())
            .field("finished", &self.finished.len())
            .field("pending", &self.pending)
            .field("routes", &self.routes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use gambit_rules::ChessRules;
    use gambit_stats::MemoryStats;

    use super::*;
    use crate::SessionStatus;

    fn matchmaker() -> MatchMaker<ChessRules> {
        MatchMaker::new(Arc::new(MemoryStats::new()))
    }

    fn player(n: u64) -> PlayerHandle {
        PlayerHandle::channel(ConnectionId::new(n)).0
    }

    #[test]
    fn test_first_request_opens_pending_session() {
        let mut mm = matchmaker();
        let id = mm.request_session(player(1));

        assert_eq!(mm.pending_id(), Some(&id));
        assert_eq!(mm.session_count(), 1);
        assert_eq!(mm.seat_of(ConnectionId::new(1)), Some((&id, Seat::White)));
        assert_eq!(
            mm.session(&id).unwrap().status(),
            SessionStatus::AwaitingOpponent
        );
    }

    #[test]
    fn test_second_request_joins_pending() {
        let mut mm = matchmaker();
        let first = mm.request_session(player(1));
        let second = mm.request_session(player(2));

        assert_eq!(first, second);
        assert_eq!(mm.pending_id(), None);
        assert_eq!(mm.session_count(), 1);
        assert_eq!(
            mm.seat_of(ConnectionId::new(2)),
            Some((&first, Seat::Black))
        );
        assert_eq!(
            mm.session(&first).unwrap().status(),
            SessionStatus::InProgress
        );
    }

    #[test]
    fn test_seated_connection_stays_put() {
        let mut mm = matchmaker();
        let id = mm.request_session(player(1));
        assert_eq!(mm.request_session(player(1)), id);

        assert_eq!(mm.session_count(), 1);
        assert_eq!(
            mm.pending_id(),
            Some(&id),
            "still waiting for a real opponent"
        );
    }

    #[test]
    fn test_id_collision_is_retried() {
        let mut ids = vec!["8", "7", "7"];
        let stats: Arc<dyn StatsRecorder> = Arc::new(MemoryStats::new());
        let mut mm: MatchMaker<ChessRules> = MatchMaker::with_id_generator(
            stats,
            Box::new(move || SessionId::new(ids.pop().unwrap_or("9"))),
        );

        let first = mm.request_session(player(1));
        mm.request_session(player(2));
        let third = mm.request_session(player(3));

        assert_eq!(first, SessionId::new("7"));
        assert_eq!(third, SessionId::new("8"));
        assert_eq!(mm.session_count(), 2);
    }

    #[test]
    fn test_finished_game_released_when_both_players_leave() {
        let mut mm = matchmaker();
        let id = mm.request_session(player(1));
        mm.request_session(player(2));

        mm.handle_close(ConnectionId::new(2));
        assert_eq!(mm.session_count(), 0);
        assert_eq!(mm.finished_count(), 1);
        assert!(mm.seat_of(ConnectionId::new(1)).is_none());
        assert_eq!(
            mm.routes.get(&ConnectionId::new(1)),
            Some(&(id, Seat::White))
        );

        mm.handle_close(ConnectionId::new(1));
        assert_eq!(mm.finished_count(), 0);
        assert!(mm.routes.is_empty());
    }

    #[test]
    fn test_start_again_leaves_finished_game() {
        let mut mm = matchmaker();
        let first = mm.request_session(player(1));
        mm.request_session(player(2));
        mm.handle_close(ConnectionId::new(2));

        let second = mm.request_session(player(1));
        assert_ne!(first, second);
        assert_eq!(mm.finished_count(), 0, "no one left attached");
        assert_eq!(mm.pending_id(), Some(&second));
        assert_eq!(
            mm.seat_of(ConnectionId::new(1)),
            Some((&second, Seat::White))
        );
    }

    #[test]
    fn test_lone_player_leaving_drops_session_outright() {
        let mut mm = matchmaker();
        mm.request_session(player(1));
        mm.handle_close(ConnectionId::new(1));

        assert_eq!(mm.session_count(), 0);
        assert_eq!(mm.finished_count(), 0);
        assert!(mm.routes.is_empty());
    }

    #[test]
    fn test_reap_ignores_unknown_notice() {
        let mut mm = matchmaker();
        let id = mm.request_session(player(1));
        (mm.reaper(true))(&SessionId::new("elsewhere"));
        mm.reap();

        assert_eq!(mm.pending_id(), Some(&id));
        assert_eq!(mm.session_count(), 1);
    }
}
