//! Serves recorded interactions back in order.

use std::collections::{BTreeMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Replays a cassette with one independent queue per `port::method` pair.
///
/// Interleaving between different methods does not matter: a replay only
/// has to call each method in the same relative order as the recording.
pub struct CassetteReplayer {
    queues: BTreeMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Indexes the interactions of a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: BTreeMap<(String, String), VecDeque<Interaction>> = BTreeMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Number of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Pops the next interaction recorded for `port::method`.
    ///
    /// # Panics
    ///
    /// Panics when the cassette holds no (more) interactions for the pair.
    /// A replay that asks for more than was recorded has diverged from the
    /// recording, and the message lists what is still available.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let key = (port.to_string(), method.to_string());
        match self.queues.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(interaction) => interaction,
            None => {
                let available: Vec<String> = self
                    .queues
                    .iter()
                    .filter(|(_, queue)| !queue.is_empty())
                    .map(|((p, m), queue)| format!("{p}::{m} ({})", queue.len()))
                    .collect();
                panic!(
                    "Cassette exhausted: no interaction left for port={port:?} method={method:?}. \
                     Remaining: [{}]",
                    available.join(", ")
                );
            }
        }
    }
}
