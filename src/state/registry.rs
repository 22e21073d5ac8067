//! Session registry.
//!
//! Owns every live session, indexed both by session id and by participant.
//! The two indexes are kept consistent at every transition; destroyed
//! sessions are never reachable through either one.

use std::collections::HashMap;

use crate::state::session::Session;
use crate::state::ParticipantId;

/// Registry of live sessions.
#[derive(Debug)]
pub struct SessionRegistry<B> {
    /// Sessions by ID
    sessions: HashMap<String, Session<B>>,

    /// Participant ID to session ID
    participant_index: HashMap<ParticipantId, String>,

    /// Allocator for session ids
    next_id: u64,
}

impl<B> Default for SessionRegistry<B> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            participant_index: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<B> SessionRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a session with a fresh id and bind both participants to it.
    ///
    /// The caller guarantees neither participant is currently bound to
    /// another session. `p1` gets the white side of the first game.
    pub fn create_session(
        &mut self,
        p1: ParticipantId,
        p2: ParticipantId,
        board: B,
    ) -> &mut Session<B> {
        let id = format!("game-{}", self.next_id);
        self.next_id += 1;

        self.participant_index.insert(p1, id.clone());
        self.participant_index.insert(p2, id.clone());

        self.sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(id, p1, p2, board))
    }

    /// Get a session by id.
    pub fn get(&self, session_id: &str) -> Option<&Session<B>> {
        self.sessions.get(session_id)
    }

    /// Get a mutable session by id.
    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut Session<B>> {
        self.sessions.get_mut(session_id)
    }

    /// Get the session a participant is bound to.
    pub fn get_for_participant(&self, participant: ParticipantId) -> Option<&Session<B>> {
        self.participant_index
            .get(&participant)
            .and_then(|id| self.sessions.get(id))
    }

    /// Get the mutable session a participant is bound to.
    pub fn get_for_participant_mut(
        &mut self,
        participant: ParticipantId,
    ) -> Option<&mut Session<B>> {
        let id = self.participant_index.get(&participant)?.clone();
        self.sessions.get_mut(&id)
    }

    /// Id of the session a participant is bound to.
    pub fn session_id_for(&self, participant: ParticipantId) -> Option<&str> {
        self.participant_index.get(&participant).map(String::as_str)
    }

    /// Unbind a participant without destroying the session. Used when a
    /// connection ends but the session must stay reachable by id for the
    /// remaining participant.
    ///
    /// Returns the session id the participant was bound to.
    pub fn release_participant(&mut self, participant: ParticipantId) -> Option<String> {
        self.participant_index.remove(&participant)
    }

    /// Check if no participant is bound to a session anymore.
    pub fn is_unbound(&self, session_id: &str) -> bool {
        match self.sessions.get(session_id) {
            Some(session) => session
                .participants()
                .into_iter()
                .all(|p| self.session_id_for(p) != Some(session_id)),
            None => false,
        }
    }

    /// Remove a session and every mapping to it.
    pub fn destroy(&mut self, session_id: &str) -> Option<Session<B>> {
        let session = self.sessions.remove(session_id)?;

        for participant in session.participants() {
            // Only drop bindings that still point at this session; the
            // participant may already be in a newer one.
            if self.participant_index.get(&participant).map(String::as_str) == Some(session_id) {
                self.participant_index.remove(&participant);
            }
        }

        Some(session)
    }

    /// Count sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Count sessions with a game in progress.
    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|s| s.is_active()).count()
    }
}
