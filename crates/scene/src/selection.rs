use tracing::info;

use crate::identifier::CountryCode;
use crate::style::CountryVisuals;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub highlighted: Option<CountryCode>,
    pub rotation_suspended: bool,
}

/// Notified after every effective transition.
pub trait SelectionObserver {
    fn on_selected(&mut self, code: &CountryCode);
    fn on_deselected(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Selected {
        code: CountryCode,
        previous: Option<CountryCode>,
        /// Slots now drawn highlighted.
        highlighted: usize,
    },
    Deselected {
        previous: CountryCode,
    },
    /// Reselecting the current code, or deselecting while idle.
    Unchanged,
    /// `select(None)`.
    Rejected,
}

impl Transition {
    pub fn is_effective(&self) -> bool {
        matches!(self, Transition::Selected { .. } | Transition::Deselected { .. })
    }
}

/// Two-state selection machine: idle, or one country highlighted.
///
/// Switching from one country to another happens in a single transition,
/// with no idle state observable in between. Every switch repaints all
/// slots, so stale highlights cannot survive.
#[derive(Default)]
pub struct SelectionMachine {
    state: SelectionState,
    observers: Vec<Box<dyn SelectionObserver>>,
}

impl std::fmt::Debug for SelectionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionMachine")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&mut self, observer: Box<dyn SelectionObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn highlighted(&self) -> Option<&CountryCode> {
        self.state.highlighted.as_ref()
    }

    pub fn rotation_suspended(&self) -> bool {
        self.state.rotation_suspended
    }

    pub fn select(&mut self, code: Option<CountryCode>, visuals: &mut CountryVisuals) -> Transition {
        let Some(code) = code else {
            return Transition::Rejected;
        };
        if self.state.highlighted.as_ref() == Some(&code) {
            return Transition::Unchanged;
        }

        visuals.reset_all();
        let highlighted = visuals.highlight_code(&code);
        let previous = self.state.highlighted.replace(code.clone());
        self.state.rotation_suspended = true;

        info!(%code, previous = ?previous.as_ref().map(CountryCode::as_str), highlighted, "selected country");
        for observer in &mut self.observers {
            observer.on_selected(&code);
        }
        Transition::Selected {
            code,
            previous,
            highlighted,
        }
    }

    pub fn deselect(&mut self, visuals: &mut CountryVisuals) -> Transition {
        let Some(previous) = self.state.highlighted.take() else {
            return Transition::Unchanged;
        };
        visuals.reset_all();
        self.state.rotation_suspended = false;

        info!(%previous, "deselected country");
        for observer in &mut self.observers {
            observer.on_deselected();
        }
        Transition::Deselected { previous }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::index::CountryIndex;
    use crate::mesh::MeshOptions;
    use formats::{GeoFeature, GeoGeometry};
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl SelectionObserver for Recorder {
        fn on_selected(&mut self, code: &CountryCode) {
            self.0.borrow_mut().push(format!("+{code}"));
        }
        fn on_deselected(&mut self) {
            self.0.borrow_mut().push("-".to_string());
        }
    }

    fn tri(lon: f64) -> GeoGeometry {
        GeoGeometry::Polygon(vec![vec![
            LonLat::new(lon, 0.0),
            LonLat::new(lon + 1.0, 0.0),
            LonLat::new(lon, 1.0),
        ]])
    }

    fn setup() -> (SelectionMachine, CountryVisuals, Rc<RefCell<Vec<String>>>) {
        let features = vec![
            GeoFeature::new("China", tri(100.0)).with_iso_code("CHN"),
            GeoFeature::new("France", tri(2.0)).with_iso_code("FRA"),
            // Second piece of the same country stored as its own feature.
            GeoFeature::new("France", tri(9.0)).with_iso_code("FRA"),
        ];
        let index = CountryIndex::build(&features, &MeshOptions::default());
        let visuals = CountryVisuals::for_index(&index);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut machine = SelectionMachine::new();
        machine.add_observer(Box::new(Recorder(log.clone())));
        (machine, visuals, log)
    }

    #[test]
    fn select_highlights_and_suspends_rotation() {
        let (mut m, mut v, log) = setup();
        let t = m.select(Some(CountryCode::new("FRA")), &mut v);
        assert_eq!(
            t,
            Transition::Selected { code: CountryCode::new("FRA"), previous: None, highlighted: 2 }
        );
        assert_eq!(v.highlighted_slots(), vec![1, 2]);
        assert!(m.rotation_suspended());
        assert_eq!(*log.borrow(), vec!["+FRA".to_string()]);
    }

    #[test]
    fn reselect_is_a_no_op() {
        let (mut m, mut v, log) = setup();
        m.select(Some(CountryCode::new("CHN")), &mut v);
        assert_eq!(m.select(Some(CountryCode::new("CHN")), &mut v), Transition::Unchanged);
        assert_eq!(v.highlighted_slots(), vec![0]);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn switching_repaints_everything() {
        let (mut m, mut v, log) = setup();
        m.select(Some(CountryCode::new("CHN")), &mut v);
        let t = m.select(Some(CountryCode::new("FRA")), &mut v);
        assert!(matches!(t, Transition::Selected { previous: Some(ref p), .. } if p == "CHN"));
        assert_eq!(v.highlighted_slots(), vec![1, 2]);
        assert_eq!(m.highlighted(), Some(&CountryCode::new("FRA")));
        assert_eq!(*log.borrow(), vec!["+CHN".to_string(), "+FRA".to_string()]);
    }

    #[test]
    fn none_is_rejected_and_deselect_resets() {
        let (mut m, mut v, log) = setup();
        assert_eq!(m.select(None, &mut v), Transition::Rejected);
        assert_eq!(m.deselect(&mut v), Transition::Unchanged);
        assert_eq!(*m.state(), SelectionState::default());

        m.select(Some(CountryCode::new("CHN")), &mut v);
        assert_eq!(m.deselect(&mut v), Transition::Deselected { previous: CountryCode::new("CHN") });
        assert_eq!(*m.state(), SelectionState::default());
        assert!(v.highlighted_slots().is_empty());
        assert_eq!(*log.borrow(), vec!["+CHN".to_string(), "-".to_string()]);
    }

    #[test]
    fn unknown_code_selects_without_highlight() {
        let (mut m, mut v, _) = setup();
        let t = m.select(Some(CountryCode::new("DEU")), &mut v);
        assert!(matches!(t, Transition::Selected { highlighted: 0, .. }));
        assert!(m.rotation_suspended());
    }
}
