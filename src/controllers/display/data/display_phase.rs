use std::fmt;

/// Where a single redraw request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPhase {
    Idle,
    PreDisplay,
    Drawing,
    Committing,
}

impl DisplayPhase {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::PreDisplay,
            Self::PreDisplay => Self::Drawing,
            Self::Drawing => Self::Committing,
            Self::Committing => Self::Idle,
        }
    }
}

impl fmt::Display for DisplayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PreDisplay => "pre-display",
            Self::Drawing => "drawing",
            Self::Committing => "committing",
        };
        write!(f, "{name}")
    }
}

/// Where a request's draw callback ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Inline,
    Background,
}

/// Returned to the caller of a redraw request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTicket {
    pub generation: u64,
    pub mode: DisplayMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_cycle_back_to_idle() {
        let mut phase = DisplayPhase::Idle;
        let mut seen = Vec::new();

        for _ in 0..4 {
            phase = phase.next();
            seen.push(phase);
        }

        assert_eq!(
            seen,
            vec![
                DisplayPhase::PreDisplay,
                DisplayPhase::Drawing,
                DisplayPhase::Committing,
                DisplayPhase::Idle,
            ]
        );
    }

    #[test]
    fn phase_display_names() {
        assert_eq!(DisplayPhase::PreDisplay.to_string(), "pre-display");
        assert_eq!(DisplayPhase::Committing.to_string(), "committing");
    }
}
