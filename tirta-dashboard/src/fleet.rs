use tirta_core::{FleetValve, ValveState, ValveStatus};

/// Client-side row filter for the fleet table.
///
/// The overview endpoint returns the whole fleet; narrowing by search
/// term or dropdown happens here, without another fetch.
#[derive(Debug, Clone, Default)]
pub struct FleetFilter {
    search: Option<Box<str>>,
    status: Option<ValveStatus>,
    state: Option<ValveState>,
}

impl FleetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match over valve code, meter code, and
    /// property name. Blank terms match everything.
    pub fn with_search(mut self, term: impl AsRef<str>) -> Self {
        let term = term.as_ref().trim().to_lowercase();
        self.search = (!term.is_empty()).then(|| term.into());
        self
    }

    pub fn with_status(mut self, status: ValveStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_state(mut self, state: ValveState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn matches(&self, row: &FleetValve) -> bool {
        if self.status.is_some_and(|status| row.valve.status != status) {
            return false;
        }
        if self.state.is_some_and(|state| row.valve.current_state != state) {
            return false;
        }
        match &self.search {
            None => true,
            Some(term) => {
                row.valve.valve_id.to_lowercase().contains(&**term)
                    || row.valve.meter_id.0.to_lowercase().contains(&**term)
                    || row.property_name.to_lowercase().contains(&**term)
            }
        }
    }

    /// Rows surviving the filter, in their original order.
    pub fn apply<'a>(&self, rows: &'a [FleetValve]) -> Vec<&'a FleetValve> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}
