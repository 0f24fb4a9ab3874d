use council_common::ProposalValue;

/// Acceptor-side ballot memory.
///
/// `None` sits below every legal value, so the first proposal always wins.
/// Both fields only ever move upwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptorBallot {
    highest_seen: Option<ProposalValue>,
    accepted: Option<ProposalValue>,
}

impl AcceptorBallot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highest_seen(&self) -> Option<ProposalValue> {
        self.highest_seen
    }

    pub fn accepted(&self) -> Option<ProposalValue> {
        self.accepted
    }

    /// Adopts `value` if it is strictly greater than anything seen so far.
    pub fn offer(&mut self, value: ProposalValue) -> bool {
        if Some(value) > self.highest_seen {
            self.highest_seen = Some(value);
            self.accepted = Some(value);
            true
        } else {
            false
        }
    }

    /// A declaration may catch the node up: equal or higher values are taken.
    pub fn observe_declaration(&mut self, value: ProposalValue) -> bool {
        if Some(value) >= self.highest_seen {
            self.highest_seen = Some(value);
            true
        } else {
            false
        }
    }
}
