//! Arbitrary-precision reference oracle.
//!
//! [`MpmathOracle`] runs a Python interpreter with an embedded script that
//! imports `mpmath` (or the copy vendored as `sympy.mpmath` by old SymPy
//! releases). Points travel as JSON on stdin and values come back as JSON on
//! stdout; complex numbers are `[re, im]` pairs on both sides. JSON has no
//! infinities, so an infinite real value comes back as `"inf"` or `"-inf"`.
//!
//! The interpreter is taken from `SPECFUN_ORACLE_PYTHON`, default `python3`.

use std::io::Write;
use std::process::{Command, Stdio};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::functions::SpecialFunction;
use crate::gate::Availability;
use crate::value::{DataValue, ValueKind};

/// Environment variable naming the reference interpreter.
pub const ORACLE_PYTHON_ENV: &str = "SPECFUN_ORACLE_PYTHON";

/// A source of reference values.
///
/// Evaluation returns one entry per point; `None` marks a point the reference
/// could not evaluate (non-convergence, a complex result for a real request,
/// NaN, or a complex infinity). Real infinities are returned as values.
pub trait ReferenceOracle {
    fn name(&self) -> &str;

    fn probe(&self) -> Availability;

    fn evaluate_real(
        &self,
        function: SpecialFunction,
        points: &[Vec<f64>],
    ) -> Result<Vec<Option<f64>>, HarnessError>;

    fn evaluate_complex(
        &self,
        function: SpecialFunction,
        points: &[Vec<Complex64>],
    ) -> Result<Vec<Option<Complex64>>, HarnessError>;
}

const IMPORT_PRELUDE: &str = r#"
import json, math, sys
try:
    import mpmath
    NAME = "mpmath"
except ImportError:
    try:
        from sympy import mpmath
        NAME = "sympy.mpmath"
    except ImportError as exc:
        mpmath = None
        MISSING = str(exc)
"#;

const PROBE_SCRIPT: &str = r#"
if mpmath is None:
    print(json.dumps({"missing": MISSING}))
else:
    print(json.dumps({"name": NAME, "version": str(mpmath.__version__)}))
"#;

const EVALUATE_SCRIPT: &str = r#"
if mpmath is None:
    sys.stderr.write("mpmath unavailable: " + MISSING)
    sys.exit(3)

no_convergence = getattr(mpmath, "NoConvergence", None)
if no_convergence is None:
    no_convergence = getattr(getattr(mpmath, "libmp", None), "NoConvergence", None)
expected = (TypeError, ValueError, ZeroDivisionError, OverflowError)
if no_convergence is not None:
    expected = expected + (no_convergence,)

request = json.loads(sys.stdin.read())
func = getattr(mpmath, request["function"])
complex_kind = request["kind"] == "complex"

def argument(raw):
    if complex_kind:
        return mpmath.mpc(raw[0], raw[1])
    return mpmath.mpf(raw)

def result(value):
    if complex_kind:
        c = complex(value)
        if math.isfinite(c.real) and math.isfinite(c.imag):
            return [c.real, c.imag]
        return None
    if isinstance(value, mpmath.mpc):
        if value.imag != 0:
            return None
        value = value.real
    x = float(value)
    if math.isnan(x):
        return None
    if math.isinf(x):
        return "inf" if x > 0 else "-inf"
    return x

values = []
for point in request["points"]:
    try:
        values.append(result(func(*[argument(p) for p in point])))
    except expected:
        values.append(None)
print(json.dumps({"values": values}))
"#;

#[derive(Serialize)]
struct EvaluateRequest<'a, T> {
    function: &'a str,
    kind: ValueKind,
    points: &'a [Vec<T>],
}

#[derive(Deserialize)]
struct EvaluateResponse {
    values: Vec<Option<serde_json::Value>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProbeResponse {
    Installed { name: String, version: String },
    Missing { missing: String },
}

/// mpmath behind a Python subprocess.
#[derive(Debug, Clone)]
pub struct MpmathOracle {
    python: String,
}

impl MpmathOracle {
    /// Interpreter from `SPECFUN_ORACLE_PYTHON`, default `python3`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_python(resolve_oracle_python())
    }

    #[must_use]
    pub fn with_python(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    #[must_use]
    pub fn python(&self) -> &str {
        &self.python
    }

    fn run_script(&self, body: &str, stdin: &[u8]) -> Result<Vec<u8>, HarnessError> {
        let script = format!("{IMPORT_PRELUDE}{body}");
        let mut child = Command::new(&self.python)
            .arg("-c")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                HarnessError::Oracle(format!(
                    "failed to invoke oracle python '{}': {err}",
                    self.python
                ))
            })?;

        // The script reads all of stdin before writing, so this cannot block
        // on a full stdout pipe.
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(stdin)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HarnessError::Oracle(format!(
                "interpreter={} status={} stderr={}",
                self.python,
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    fn evaluate<T: DataValue>(
        &self,
        function: SpecialFunction,
        points: &[Vec<T>],
    ) -> Result<Vec<Option<T>>, HarnessError> {
        if let Some(bad) = points.iter().find(|p| p.len() != function.arity()) {
            return Err(HarnessError::ArityMismatch {
                function: function.to_string(),
                expected: function.arity(),
                found: bad.len(),
            });
        }
        let request = serde_json::to_vec(&EvaluateRequest {
            function: function.reference_name(),
            kind: T::KIND,
            points,
        })?;
        let stdout = self.run_script(EVALUATE_SCRIPT, &request)?;
        decode_values(&stdout)
    }
}

impl ReferenceOracle for MpmathOracle {
    fn name(&self) -> &str {
        "mpmath"
    }

    fn probe(&self) -> Availability {
        let stdout = match self.run_script(PROBE_SCRIPT, &[]) {
            Ok(stdout) => stdout,
            Err(err) => {
                return Availability::Missing {
                    reason: err.to_string(),
                };
            }
        };
        match serde_json::from_slice::<ProbeResponse>(&stdout) {
            Ok(ProbeResponse::Installed { name, version }) => {
                Availability::Installed { name, version }
            }
            Ok(ProbeResponse::Missing { missing }) => Availability::Missing { reason: missing },
            Err(err) => Availability::Missing {
                reason: format!("unreadable probe output: {err}"),
            },
        }
    }

    fn evaluate_real(
        &self,
        function: SpecialFunction,
        points: &[Vec<f64>],
    ) -> Result<Vec<Option<f64>>, HarnessError> {
        self.evaluate(function, points)
    }

    fn evaluate_complex(
        &self,
        function: SpecialFunction,
        points: &[Vec<Complex64>],
    ) -> Result<Vec<Option<Complex64>>, HarnessError> {
        self.evaluate(function, points)
    }
}

fn decode_values<T: DataValue>(stdout: &[u8]) -> Result<Vec<Option<T>>, HarnessError> {
    let response: EvaluateResponse = serde_json::from_slice(stdout)?;
    response
        .values
        .into_iter()
        .map(|value| value.map(T::from_json_value).transpose())
        .collect()
}

fn resolve_oracle_python() -> String {
    std::env::var(ORACLE_PYTHON_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "python3".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_SUCH_PYTHON: &str = "specfun-no-such-interpreter";

    #[test]
    fn unlaunchable_interpreter_reports_missing() {
        let oracle = MpmathOracle::with_python(NO_SUCH_PYTHON);
        match oracle.probe() {
            Availability::Missing { reason } => assert!(reason.contains(NO_SUCH_PYTHON)),
            other => panic!("expected missing, got {other:?}"),
        }
    }

    #[test]
    fn unlaunchable_interpreter_fails_evaluation() {
        let oracle = MpmathOracle::with_python(NO_SUCH_PYTHON);
        let err = oracle
            .evaluate_real(SpecialFunction::Expi, &[vec![1.0]])
            .unwrap_err();
        assert!(matches!(err, HarnessError::Oracle(_)));
    }

    #[test]
    fn arity_is_checked_before_spawning() {
        let oracle = MpmathOracle::with_python(NO_SUCH_PYTHON);
        let err = oracle
            .evaluate_real(SpecialFunction::Hyp2f1, &[vec![1.0, 2.0]])
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::ArityMismatch {
                expected: 4,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn request_encodes_complex_points_as_pairs() {
        let points = vec![vec![Complex64::new(1.5, -2.0)]];
        let json = serde_json::to_value(EvaluateRequest {
            function: "ei",
            kind: ValueKind::Complex,
            points: &points,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"function": "ei", "kind": "complex", "points": [[[1.5, -2.0]]]})
        );
    }

    #[test]
    fn response_nulls_become_none() {
        let values: Vec<Option<f64>> =
            decode_values(br#"{"values": [1.25, null, -3.0]}"#).unwrap();
        assert_eq!(values, vec![Some(1.25), None, Some(-3.0)]);
        let values: Vec<Option<Complex64>> =
            decode_values(br#"{"values": [[0.5, 2.0], null]}"#).unwrap();
        assert_eq!(values, vec![Some(Complex64::new(0.5, 2.0)), None]);
    }

    #[test]
    fn response_infinities_are_values() {
        let values: Vec<Option<f64>> =
            decode_values(br#"{"values": ["inf", "-inf", 2.0]}"#).unwrap();
        assert_eq!(
            values,
            vec![Some(f64::INFINITY), Some(f64::NEG_INFINITY), Some(2.0)]
        );
        let err = decode_values::<f64>(br#"{"values": ["huge"]}"#).unwrap_err();
        assert!(matches!(err, HarnessError::Json(_)), "{err}");
    }

    #[test]
    fn probe_response_shapes() {
        let installed: ProbeResponse =
            serde_json::from_str(r#"{"name": "mpmath", "version": "1.3.0"}"#).unwrap();
        assert!(matches!(installed, ProbeResponse::Installed { .. }));
        let missing: ProbeResponse =
            serde_json::from_str(r#"{"missing": "No module named 'mpmath'"}"#).unwrap();
        assert!(matches!(missing, ProbeResponse::Missing { .. }));
    }
}
