/// Where a menu is in its life. Once `Stopped` it may be started again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Created,
    Starting,
    Running,
    Paused,
    Exiting,
    Stopped,
}

impl Lifecycle {
    /// The loop thread exists and hasn't finished yet.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Lifecycle::Starting | Lifecycle::Running | Lifecycle::Paused | Lifecycle::Exiting
        )
    }
}
