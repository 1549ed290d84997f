use std::fmt;

/// Structural properties of a matrix that allow kernels to skip regions that
/// are known to be zero.
///
/// Flags are kept consistent by the constructors: a strictly lower matrix is
/// also lower, a unit lower matrix is lower with ones on the diagonal, a
/// diagonal matrix is lower, upper and symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Structure {
    lower: bool,
    upper: bool,
    strictly_lower: bool,
    strictly_upper: bool,
    symmetric: bool,
    unit_diagonal: bool,
}

impl Structure {
    /// No structural guarantees.
    pub const GENERAL: Structure = Structure {
        lower: false,
        upper: false,
        strictly_lower: false,
        strictly_upper: false,
        symmetric: false,
        unit_diagonal: false,
    };

    pub fn general() -> Self {
        Self::GENERAL
    }

    /// Nonzeros only on or below the diagonal.
    pub fn lower() -> Self {
        Structure {
            lower: true,
            ..Self::GENERAL
        }
    }

    /// Nonzeros only strictly below the diagonal.
    pub fn strictly_lower() -> Self {
        Structure {
            lower: true,
            strictly_lower: true,
            ..Self::GENERAL
        }
    }

    /// Lower triangular with every diagonal element equal to one.
    pub fn uni_lower() -> Self {
        Structure {
            lower: true,
            unit_diagonal: true,
            ..Self::GENERAL
        }
    }

    /// Nonzeros only on or above the diagonal.
    pub fn upper() -> Self {
        Structure {
            upper: true,
            ..Self::GENERAL
        }
    }

    /// Nonzeros only strictly above the diagonal.
    pub fn strictly_upper() -> Self {
        Structure {
            upper: true,
            strictly_upper: true,
            ..Self::GENERAL
        }
    }

    /// Upper triangular with every diagonal element equal to one.
    pub fn uni_upper() -> Self {
        Structure {
            upper: true,
            unit_diagonal: true,
            ..Self::GENERAL
        }
    }

    /// Nonzeros only on the diagonal.
    pub fn diagonal() -> Self {
        Structure {
            lower: true,
            upper: true,
            symmetric: true,
            ..Self::GENERAL
        }
    }

    /// `a(i, j) == a(j, i)` for all i, j.
    pub fn symmetric() -> Self {
        Structure {
            symmetric: true,
            ..Self::GENERAL
        }
    }

    pub fn is_general(&self) -> bool {
        *self == Self::GENERAL
    }

    pub fn is_diagonal(&self) -> bool {
        self.lower && self.upper
    }

    pub fn is_lower(&self) -> bool {
        self.lower
    }

    pub fn is_upper(&self) -> bool {
        self.upper
    }

    pub fn is_strictly_lower(&self) -> bool {
        self.strictly_lower
    }

    pub fn is_strictly_upper(&self) -> bool {
        self.strictly_upper
    }

    pub fn is_uni_lower(&self) -> bool {
        self.lower && self.unit_diagonal
    }

    pub fn is_uni_upper(&self) -> bool {
        self.upper && self.unit_diagonal
    }

    /// Every diagonal element is one.
    pub fn has_unit_diagonal(&self) -> bool {
        self.unit_diagonal
    }

    pub fn is_triangular(&self) -> bool {
        self.lower || self.upper
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Structure of the product `left * right`.
    ///
    /// The product of two lower (upper) matrices is lower (upper); it is
    /// strictly lower if one factor is strictly lower and the other lower,
    /// and unit lower if both factors are. Symmetry is never inherited.
    pub fn product(left: Structure, right: Structure) -> Structure {
        let lower = left.lower && right.lower;
        let upper = left.upper && right.upper;
        Structure {
            lower,
            upper,
            strictly_lower: (left.strictly_lower && right.lower)
                || (right.strictly_lower && left.lower),
            strictly_upper: (left.strictly_upper && right.upper)
                || (right.strictly_upper && left.upper),
            symmetric: lower && upper,
            unit_diagonal: left.unit_diagonal && right.unit_diagonal && (lower || upper),
        }
    }

    /// Structure of a scalar multiple: zero pattern and symmetry are kept, a
    /// unit diagonal is not.
    pub fn scaled(self) -> Structure {
        Structure {
            unit_diagonal: false,
            ..self
        }
    }

    /// Structure of the transpose.
    pub fn transposed(self) -> Structure {
        Structure {
            lower: self.upper,
            upper: self.lower,
            strictly_lower: self.strictly_upper,
            strictly_upper: self.strictly_lower,
            ..self
        }
    }

    /// Flags that hold for both `self` and `other`, e.g. for the sum of two
    /// matrices. A unit diagonal does not survive a sum.
    pub fn meet(self, other: Structure) -> Structure {
        Structure {
            lower: self.lower && other.lower,
            upper: self.upper && other.upper,
            strictly_lower: self.strictly_lower && other.strictly_lower,
            strictly_upper: self.strictly_upper && other.strictly_upper,
            symmetric: self.symmetric && other.symmetric,
            unit_diagonal: false,
        }
    }

    /// Returns true if a nonzero value at (i, j) is permitted.
    pub fn allows(&self, i: usize, j: usize) -> bool {
        if self.strictly_lower && i <= j {
            return false;
        }
        if self.strictly_upper && i >= j {
            return false;
        }
        if self.lower && i < j {
            return false;
        }
        if self.upper && i > j {
            return false;
        }
        true
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.is_diagonal() {
            "diagonal"
        } else if self.is_uni_lower() {
            "unit lower"
        } else if self.is_uni_upper() {
            "unit upper"
        } else if self.strictly_lower {
            "strictly lower"
        } else if self.lower {
            "lower"
        } else if self.strictly_upper {
            "strictly upper"
        } else if self.upper {
            "upper"
        } else if self.symmetric {
            "symmetric"
        } else {
            "general"
        };
        write!(f, "{}", name)
    }
}
