//! KidCal Status Tool
//!
//! Provides runtime status information about the KidCal service.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::config::CalculatorConfig;

/// Calculator usage instructions for AI assistants
pub const CALCULATOR_INSTRUCTIONS: &str = r#"
# KidCal Calculator Instructions

KidCal estimates the glomerular filtration rate (eGFR) of a child from measured
lab values and height. Results are in ml/min/1.73 m².

## Fields and Units

| Field | id | Units (index: label) | Canonical |
|-------|----|----------------------|-----------|
| Creatinine | `crea` | 0: µmol/l, 1: mg/dl | mg/dl |
| BUN (urea) | `urea` | 0: mmol/l, 1: mg/dl | mg/dl |
| Cystatin C | `cysc` | 0: mg/l | mg/l |
| Height | `height` | 0: cm, 1: in | cm |

Conversions: creatinine 1 mg/dl = 88.4 µmol/l, BUN 1 mg/dl = 0.3571 mmol/l,
1 in = 2.54 cm. Units may be given by id (`µmol`, `umol`, `mg`, `mmol`, `cm`,
`in`), by label (`µmol/l`) or by index.

## Entering Values

Values are plain decimal numbers. A comma is read as a decimal point. Signs,
exponents, spaces and letters are rejected, and a rejected edit leaves the
previous value in place.

An empty field counts as 0. **A missing value does not block the calculation**:
it turns the affected term into 0, and the result reads `0.00`. Always check
that all four fields and the gender are filled before reporting a result.

## Workflow

1. `set_field_value` for `crea`, `urea`, `cysc` and `height`
2. `select_unit` if a value is not in the canonical unit
3. `set_gender` with `female` or `male`
4. Read `result.ckid` and `result.bedside` from the response
5. `clear_all` before starting a new patient

For one-off numbers without a session, use `convert_to_canonical`,
`compute_ckid` and `compute_bedside`.

## Formulas

**CKiD Schwartz equation**

eGFR = 39.1 × (height_m / creatinine_mg/dl)^0.516 × (1.8 / cystatinC_mg/l)^0.294
× (30 / BUN_mg/dl)^0.169 × (height_m / 1.4)^0.188 × 1.099 [only if male]

Gender "unset" is calculated like female.

**Bedside Schwartz equation**

eGFR = 0.413 × height_cm / creatinine_mg/dl

## Display

Results have two decimals. When the server runs with
`KIDCAL_DISPLAY_MODE=capped`, CKiD results of 75 or more read `> 75`.

## Sources

- Schwartz et al. New equations to estimate GFR in children with CKD.
  J Am Soc Nephrol. 2009 Mar;20(3):629-37. https://pubmed.ncbi.nlm.nih.gov/19158356/
- Staples et al. Validation of the revised Schwartz estimating equation in a
  predominantly non-CKD population. Pediatr Nephrol. 2010 Nov;25(11):2321-6.
  https://pubmed.ncbi.nlm.nih.gov/20652327/
"#;

/// Runtime status of the KidCal service
#[derive(Debug, Clone, Serialize)]
pub struct KidcalStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Active calculator configuration
    pub config: CalculatorConfig,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: String,
    config: CalculatorConfig,
}

impl StatusTracker {
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            config,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> KidcalStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        KidcalStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            config: self.config,
            started_at: self.started_at.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_config() {
        let tracker = StatusTracker::new(CalculatorConfig::default());
        let status = tracker.get_status();
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.config, CalculatorConfig::default());
        assert!(status.started_at.ends_with('Z'));
    }

    #[test]
    fn test_instructions_cover_every_field() {
        for id in ["`crea`", "`urea`", "`cysc`", "`height`"] {
            assert!(CALCULATOR_INSTRUCTIONS.contains(id), "missing {}", id);
        }
    }
}
