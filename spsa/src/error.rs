use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire spsa crate.
pub type Result<T> = std::result::Result<T, SpsaErr>;

/// The spsa crate's error type.
#[derive(Debug)]
pub enum SpsaErr {
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidHyperparameter {
        name: &'static str,
        value: f64,
    },
    EmptyPoint,
    Loss(Box<dyn Error + Send + Sync>),
}

impl SpsaErr {
    /// Wraps an error raised while evaluating the objective.
    ///
    /// # Arguments
    /// * `err` - The objective's error.
    pub fn loss<E>(err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::Loss(err.into())
    }
}

impl Display for SpsaErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpsaErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            SpsaErr::InvalidHyperparameter { name, value } => {
                write!(f, "Invalid value for hyperparameter {name}: {value}")
            }
            SpsaErr::EmptyPoint => f.write_str("Cannot sample directions for an empty point"),
            SpsaErr::Loss(e) => write!(f, "The loss evaluation failed: {e}"),
        }
    }
}

impl Error for SpsaErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SpsaErr::Loss(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Checks that a decay rate lies in the open interval (0, 1).
///
/// # Arguments
/// * `name` - The name of the hyperparameter, used in the error.
/// * `value` - The decay rate.
///
/// # Returns
/// The same value or an error if it is out of range.
pub(crate) fn check_decay(name: &'static str, value: f64) -> Result<f64> {
    if value > 0. && value < 1. {
        return Ok(value);
    }

    Err(SpsaErr::InvalidHyperparameter { name, value })
}

/// Checks that `value` is strictly positive and finite.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0. {
        return Ok(value);
    }

    Err(SpsaErr::InvalidHyperparameter { name, value })
}

/// Checks that `got` matches `expected`.
pub(crate) fn check_size(a: &'static str, b: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(SpsaErr::SizeMismatch {
            a,
            b,
            got,
            expected,
        });
    }

    Ok(())
}
