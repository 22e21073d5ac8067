//! Event dispatch façade.
//!
//! The orchestrator owns the matchmaking queue and the session registry and
//! turns every inbound event into the outbound notices the transport must
//! deliver. It holds no per-session state of its own: membership and colors
//! are always resolved through the registry, and boards are only touched
//! through the owning session.
//!
//! Out-of-context events (moves for finished or unknown sessions, rematch
//! votes while a game is running, disconnects of unknown participants) are
//! dropped with a debug log and never fail the process. Rule violations are
//! reported only to the submitter.

use tracing::{debug, info};

use crate::state::event::{InboundEvent, OutboundEvent, Outgoing};
use crate::state::queue::MatchQueue;
use crate::state::registry::SessionRegistry;
use crate::state::rules::{Color, MoveDescriptor, RulesEngine};
use crate::state::session::{MoveRejection, RematchOutcome};
use crate::state::ParticipantId;

/// Orchestrates matchmaking, sessions and the notices around them.
pub struct Orchestrator<R: RulesEngine> {
    rules: R,
    queue: MatchQueue,
    registry: SessionRegistry<R::Board>,

    /// Pairings made so far; alternates which side gets the first move
    pairings: u64,
}

impl<R: RulesEngine> Orchestrator<R> {
    pub fn new(rules: R) -> Self {
        Self {
            rules,
            queue: MatchQueue::new(),
            registry: SessionRegistry::new(),
            pairings: 0,
        }
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    pub fn registry(&self) -> &SessionRegistry<R::Board> {
        &self.registry
    }

    /// Handle one inbound event and return every notice to deliver.
    pub fn handle(&mut self, participant: ParticipantId, event: InboundEvent) -> Vec<Outgoing> {
        match event {
            InboundEvent::FindGame => self.find_game(participant),
            InboundEvent::Move { session_id, mv } => {
                self.submit_move(participant, &session_id, &mv)
            }
            InboundEvent::Resign { session_id } => self.resign(participant, &session_id),
            InboundEvent::Rematch { session_id } => self.rematch(participant, &session_id),
            InboundEvent::Disconnect => self.disconnect(participant),
        }
    }

    fn find_game(&mut self, participant: ParticipantId) -> Vec<Outgoing> {
        let mut out = Vec::new();

        if let Some(session) = self.registry.get_for_participant(participant) {
            if session.is_active() {
                debug!(participant, "find_game ignored: already in an active session");
                return Vec::new();
            }

            // A new search supersedes the finished session's rematch window
            let session_id = session.id().to_string();
            out.extend(self.depart(participant, &session_id));
        }

        match self.queue.enqueue(participant) {
            Some((first, second)) => out.extend(self.start_session(first, second)),
            None => out.push(Outgoing::new(
                participant,
                OutboundEvent::QueueStatus {
                    message: "Waiting for an opponent...".to_string(),
                },
            )),
        }
        out
    }

    fn start_session(&mut self, first: ParticipantId, second: ParticipantId) -> Vec<Outgoing> {
        // Alternate which side of the pairing gets the first move
        let (white, black) = if self.pairings % 2 == 0 {
            (first, second)
        } else {
            (second, first)
        };
        self.pairings += 1;

        let board = self.rules.new_game();
        let session = self.registry.create_session(white, black, board);
        let session_id = session.id().to_string();
        let position = session.position(&self.rules);

        info!(session_id = %session_id, white, black, "session started");

        vec![
            Outgoing::new(
                white,
                OutboundEvent::GameStart {
                    session_id: session_id.clone(),
                    color: Color::White,
                    position: position.clone(),
                },
            ),
            Outgoing::new(
                black,
                OutboundEvent::GameStart {
                    session_id,
                    color: Color::Black,
                    position,
                },
            ),
        ]
    }

    fn submit_move(
        &mut self,
        participant: ParticipantId,
        session_id: &str,
        mv: &MoveDescriptor,
    ) -> Vec<Outgoing> {
        let session = match self.registry.get_for_participant_mut(participant) {
            Some(session) => session,
            None => {
                debug!(participant, "move ignored: participant has no session");
                return Vec::new();
            }
        };
        if session.id() != session_id {
            debug!(participant, session_id, "move ignored: session id mismatch");
            return Vec::new();
        }

        match session.submit_move(&self.rules, participant, mv) {
            Ok(outcome) => {
                let [a, b] = session.participants();
                let update = OutboundEvent::PositionUpdate {
                    position: outcome.position,
                    history: outcome.history,
                };
                let mut out = vec![
                    Outgoing::new(a, update.clone()),
                    Outgoing::new(b, update),
                ];

                if let Some(reason) = outcome.terminated {
                    info!(session_id, reason = reason.as_str(), "game over");
                    out.push(Outgoing::new(a, OutboundEvent::GameOver { reason }));
                    out.push(Outgoing::new(b, OutboundEvent::GameOver { reason }));
                }
                out
            }
            Err(MoveRejection::SessionOver) => {
                debug!(participant, session_id, "move ignored: session already over");
                Vec::new()
            }
            Err(rejection) => vec![Outgoing::new(
                participant,
                OutboundEvent::MoveRejected {
                    reason: rejection.to_string(),
                },
            )],
        }
    }

    fn resign(&mut self, participant: ParticipantId, session_id: &str) -> Vec<Outgoing> {
        let session = match self.registry.get_for_participant_mut(participant) {
            Some(session) => session,
            None => {
                debug!(participant, "resign ignored: participant has no session");
                return Vec::new();
            }
        };
        if session.id() != session_id {
            debug!(participant, session_id, "resign ignored: session id mismatch");
            return Vec::new();
        }

        match session.resign(participant) {
            Some(reason) => {
                info!(session_id, participant, "participant resigned");
                let [a, b] = session.participants();
                vec![
                    Outgoing::new(a, OutboundEvent::GameOver { reason }),
                    Outgoing::new(b, OutboundEvent::GameOver { reason }),
                ]
            }
            None => {
                debug!(participant, session_id, "resign ignored: session not active");
                Vec::new()
            }
        }
    }

    fn rematch(&mut self, participant: ParticipantId, session_id: &str) -> Vec<Outgoing> {
        let session = match self.registry.get_for_participant_mut(participant) {
            Some(session) => session,
            None => {
                debug!(participant, "rematch ignored: participant has no session");
                return Vec::new();
            }
        };
        if session.id() != session_id {
            debug!(participant, session_id, "rematch ignored: session id mismatch");
            return Vec::new();
        }

        match session.request_rematch(&self.rules, participant) {
            RematchOutcome::Offered { opponent } => {
                vec![Outgoing::new(opponent, OutboundEvent::RematchOffered)]
            }
            RematchOutcome::Restarted => {
                let position = session.position(&self.rules);
                let white = session.participant_for(Color::White);
                let black = session.participant_for(Color::Black);

                info!(session_id, "rematch started");

                vec![
                    Outgoing::new(
                        white,
                        OutboundEvent::RematchStart {
                            color: Color::White,
                            position: position.clone(),
                        },
                    ),
                    Outgoing::new(
                        black,
                        OutboundEvent::RematchStart {
                            color: Color::Black,
                            position,
                        },
                    ),
                ]
            }
            RematchOutcome::Ignored => {
                debug!(participant, session_id, "rematch ignored");
                Vec::new()
            }
        }
    }

    fn disconnect(&mut self, participant: ParticipantId) -> Vec<Outgoing> {
        if self.queue.remove(participant) {
            debug!(participant, "left matchmaking queue");
            return Vec::new();
        }

        let session_id = match self.registry.session_id_for(participant) {
            Some(id) => id.to_string(),
            None => {
                debug!(participant, "disconnect ignored: no session");
                return Vec::new();
            }
        };

        self.depart(participant, &session_id)
    }

    /// Record a participant leaving their session (disconnect or superseding
    /// search), notify the still-present opponent, then unbind the leaver and
    /// destroy the session once nobody is bound to it anymore.
    ///
    /// The opponent always learns that the peer is gone; the termination
    /// notice is added only when the departure ended a running game. After a
    /// departure a pending rematch offer can never complete, so the survivor
    /// must not be left waiting on one.
    fn depart(&mut self, participant: ParticipantId, session_id: &str) -> Vec<Outgoing> {
        let mut out = Vec::new();

        if let Some(session) = self.registry.get_mut(session_id) {
            let reason = session.leave(participant);
            if reason.is_some() {
                info!(session_id, participant, "participant left mid-game");
            }

            if let Some(opponent) = session.opponent_of(participant) {
                if !session.has_departed(opponent) {
                    out.push(Outgoing::new(opponent, OutboundEvent::OpponentLeft));
                    if let Some(reason) = reason {
                        out.push(Outgoing::new(opponent, OutboundEvent::GameOver { reason }));
                    }
                }
            }
        }

        self.registry.release_participant(participant);
        if self.registry.is_unbound(session_id) {
            self.registry.destroy(session_id);
            info!(session_id, "session destroyed");
        }

        out
    }
}
