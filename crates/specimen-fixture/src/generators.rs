//! Primitive value generators
//!
//! Each generator answers plain type requests for the built-in types it
//! knows and declines everything else. Generators own their sequence state
//! behind a lock, so one engine serves every resolution of a fixture.

use parking_lot::Mutex;
use specimen_kernel::type_ref::{
    BOOL, CHAR, F32, F64, I16, I32, I64, I8, STRING, U16, U32, U64, U8, UUID,
};
use specimen_kernel::{
    Request, SpecimenBuilder, SpecimenContext, SpecimenError, Specimen, TypeRef, Value,
};
use std::collections::HashMap;
use uuid::Uuid;

fn requested_name(request: &Request) -> Option<&str> {
    request.as_type().filter(|t| !t.is_generic()).and_then(TypeRef::name)
}

/// Largest value handed out for an integer type before its sequence restarts
fn upper_bound(name: &str) -> Option<i64> {
    Some(match name {
        I8 => i64::from(i8::MAX),
        I16 => i64::from(i16::MAX),
        I32 => i64::from(i32::MAX),
        U8 => i64::from(u8::MAX),
        U16 => i64::from(u16::MAX),
        U32 => i64::from(u32::MAX),
        I64 | U64 | F32 | F64 => i64::MAX,
        _ => return None,
    })
}

/// Numbers 1, 2, 3, ... with an independent sequence per numeric type
#[derive(Debug, Default)]
pub struct NumericSequenceGenerator {
    counters: Mutex<HashMap<String, i64>>,
}

impl NumericSequenceGenerator {
    /// Create generator with every sequence at its start
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self, name: &str, bound: i64) -> i64 {
        let mut counters = self.counters.lock();
        let counter = counters.entry(name.to_string()).or_insert(0);
        *counter = if *counter >= bound { 1 } else { *counter + 1 };
        *counter
    }
}

impl SpecimenBuilder for NumericSequenceGenerator {
    fn create(
        &self,
        request: &Request,
        _context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Some(name) = requested_name(request) else {
            return Ok(Specimen::NoSpecimen);
        };
        let Some(bound) = upper_bound(name) else {
            return Ok(Specimen::NoSpecimen);
        };
        let n = self.next(name, bound);
        #[allow(clippy::cast_precision_loss)]
        let value = match name {
            F32 | F64 => Value::Float(n as f64),
            _ => Value::Int(n),
        };
        Ok(Specimen::Created(value))
    }
}

/// `true`, `false`, `true`, ...
#[derive(Debug, Default)]
pub struct BooleanSwitch {
    next: Mutex<bool>,
}

impl BooleanSwitch {
    /// Create switch that starts with `true`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { next: Mutex::new(true) }
    }
}

impl SpecimenBuilder for BooleanSwitch {
    fn create(
        &self,
        request: &Request,
        _context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        if requested_name(request) != Some(BOOL) {
            return Ok(Specimen::NoSpecimen);
        }
        let mut next = self.next.lock();
        let value = *next;
        *next = !value;
        Ok(Specimen::Created(Value::Bool(value)))
    }
}

const FIRST_PRINTABLE: u8 = b'!';
const LAST_PRINTABLE: u8 = b'~';

/// Printable ASCII characters in order, wrapping after `~`
#[derive(Debug)]
pub struct CharSequenceGenerator {
    next: Mutex<u8>,
}

impl Default for CharSequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CharSequenceGenerator {
    /// Create generator starting at `!`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: Mutex::new(FIRST_PRINTABLE),
        }
    }
}

impl SpecimenBuilder for CharSequenceGenerator {
    fn create(
        &self,
        request: &Request,
        _context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        if requested_name(request) != Some(CHAR) {
            return Ok(Specimen::NoSpecimen);
        }
        let mut next = self.next.lock();
        let c = char::from(*next);
        *next = if *next >= LAST_PRINTABLE { FIRST_PRINTABLE } else { *next + 1 };
        Ok(Specimen::Created(Value::Char(c)))
    }
}

/// Fresh UUID text for every string request
#[derive(Debug, Clone, Copy, Default)]
pub struct StringGenerator;

impl SpecimenBuilder for StringGenerator {
    fn create(
        &self,
        request: &Request,
        _context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        if requested_name(request) != Some(STRING) {
            return Ok(Specimen::NoSpecimen);
        }
        Ok(Specimen::Created(Value::Str(Uuid::new_v4().to_string())))
    }
}

/// Fresh random UUID for every identifier request
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl SpecimenBuilder for UuidGenerator {
    fn create(
        &self,
        request: &Request,
        _context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        if requested_name(request) != Some(UUID) {
            return Ok(Specimen::NoSpecimen);
        }
        Ok(Specimen::Created(Value::Uuid(Uuid::new_v4())))
    }
}
