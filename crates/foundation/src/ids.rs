/// Monotonic sequence number used to tag work issued for one selection.
///
/// Ordering follows issue order; the initial value is `Generation::ZERO`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Self = Generation(0);

    pub fn new(n: u64) -> Self {
        Generation(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Generation;

    #[test]
    fn next_is_strictly_increasing() {
        let g = Generation::ZERO;
        assert!(g.next() > g);
        assert_eq!(g.next().get(), 1);
    }
}
