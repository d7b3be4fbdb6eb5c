/// Drive validator -- resolves a picker selection to a [`DriveRef`].
///
/// The mapping is captured on every refresh. Validation never touches the
/// OS beyond an existence check, and every failure is a user-facing
/// [`ValidationError`] rather than a task error.
use crate::error::ValidationError;
use crate::model::DriveRef;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct DriveValidator {
    by_display: HashMap<String, DriveRef>,
    order: Vec<String>,
}

impl DriveValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mapping with a freshly enumerated list.
    pub fn refresh(&mut self, drives: Vec<DriveRef>) {
        self.by_display.clear();
        self.order.clear();
        for drive in drives {
            let key = drive.display_name();
            if self.by_display.insert(key.clone(), drive).is_none() {
                self.order.push(key);
            }
        }
    }

    /// Picker entries in enumeration order.
    pub fn selections(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve `selection` and confirm the device is still there.
    pub fn validate(&self, selection: &str) -> Result<DriveRef, ValidationError> {
        if selection.is_empty() {
            return Err(ValidationError::NoSelection);
        }
        let drive = self
            .by_display
            .get(selection)
            .ok_or(ValidationError::UnknownSelection)?;
        if !drive.is_present() {
            return Err(ValidationError::Unavailable(drive.path.clone()));
        }
        Ok(drive.clone())
    }
}
