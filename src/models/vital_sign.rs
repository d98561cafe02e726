use serde::Serialize;

/// Most recent vital-sign reading for a patient, as shown on every dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct VitalSnapshot {
    pub body_temperature: f64,
    pub pulse_rate: i64,
    pub respiration_rate: i64,
    pub systolic_pressure: i64,
    pub diastolic_pressure: i64,
}

impl VitalSnapshot {
    /// Blood pressure formatted the way clinicians read it, e.g. `120/80`.
    pub fn blood_pressure(&self) -> String {
        format!("{}/{}", self.systolic_pressure, self.diastolic_pressure)
    }
}

/// Readings compare by bit pattern, so a stored NaN temperature equals itself.
impl PartialEq for VitalSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.body_temperature.to_bits() == other.body_temperature.to_bits()
            && self.pulse_rate == other.pulse_rate
            && self.respiration_rate == other.respiration_rate
            && self.systolic_pressure == other.systolic_pressure
            && self.diastolic_pressure == other.diastolic_pressure
    }
}
