/// Operator command decoded from a command channel message.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerCommand {
    SetTargetTemp(f64),
    SetBrewId(String),
}

impl ControllerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerCommand::SetTargetTemp(_) => "SetTargetTemp",
            ControllerCommand::SetBrewId(_) => "SetBrewId",
        }
    }
}

/// What the operator wants the fermenter to do. Only the coordinator holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredState {
    pub target_temp: f64,
    pub brew_id: String,
}

impl DesiredState {
    pub fn new(target_temp: f64, brew_id: impl Into<String>) -> Self {
        DesiredState {
            target_temp,
            brew_id: brew_id.into(),
        }
    }

    pub fn apply(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::SetTargetTemp(value) => self.target_temp = value,
            ControllerCommand::SetBrewId(brew_id) => self.brew_id = brew_id,
        }
    }

    /// `None` means the device has not reported a target yet, nothing to correct.
    pub fn reconcile_state(&self, last_observed_target: Option<f64>) -> ReconcileState {
        match last_observed_target {
            Some(observed) if !same_setpoint(self.target_temp, observed) => ReconcileState::NeedsUpdate,
            _ => ReconcileState::InSync,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    InSync,
    NeedsUpdate,
}

/// The device stores its setpoint with a resolution of a tenth of a degree.
pub fn same_setpoint(desired: f64, observed: f64) -> bool {
    (desired * 10.0).round() == (observed * 10.0).round()
}

/// Serial representation of a setpoint, e.g. `<20.5>`.
pub fn encode_setpoint(value: f64) -> String {
    format!("<{value:?}>")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_apply_target_temp_only() {
        let mut state = DesiredState::new(18.0, "42-IPA-01");
        state.apply(ControllerCommand::SetTargetTemp(20.5));
        assert_eq!(state, DesiredState::new(20.5, "42-IPA-01"));
    }

    #[test]
    fn should_apply_brew_id_only() {
        let mut state = DesiredState::new(18.0, "42-IPA-01");
        state.apply(ControllerCommand::SetBrewId("43-STOUT-01".into()));
        assert_eq!(state, DesiredState::new(18.0, "43-STOUT-01"));
    }

    #[test]
    fn should_be_in_sync_until_device_reports() {
        let state = DesiredState::new(18.0, "42-IPA-01");
        assert_eq!(state.reconcile_state(None), ReconcileState::InSync);
    }

    #[test]
    fn should_compare_with_device_resolution() {
        let state = DesiredState::new(18.0, "42-IPA-01");
        assert_eq!(state.reconcile_state(Some(18.0)), ReconcileState::InSync);
        assert_eq!(state.reconcile_state(Some(18.04)), ReconcileState::InSync);
        assert_eq!(state.reconcile_state(Some(18.1)), ReconcileState::NeedsUpdate);
        assert_eq!(state.reconcile_state(Some(20.5)), ReconcileState::NeedsUpdate);
    }

    #[test]
    fn should_encode_setpoint_between_brackets() {
        assert_eq!(encode_setpoint(20.5), "<20.5>");
        assert_eq!(encode_setpoint(18.0), "<18.0>");
        assert_eq!(encode_setpoint(21.3), "<21.3>");
    }
}
