/// Per-ticket object counts across the three storage areas.
///
/// Derived from the store on every query, never cached or stored: the
/// session state machine is a pure function of these counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionCounts {
    pub input: usize,
    pub interim: usize,
    pub output: usize,
}

impl SessionCounts {
    /// Per-image normalization is done and there is something to merge:
    /// inputs are deleted only once fully processed into the interim area,
    /// and a single frame cannot animate.
    pub fn ready(&self) -> bool {
        self.input == 0 && self.interim > 1
    }

    /// The merged artifact exists.
    pub fn complete(&self) -> bool {
        self.output > 0
    }
}
