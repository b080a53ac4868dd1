//! Arithmetic series
//!
//! The abstract list kind behind `lseq`: a start value, a step and a
//! length. Elements are computed from their position, so a series of any
//! length costs the same few words until it is materialized.
//!
//! # Integer and double series
//!
//! A series is integer when every operand is an integer. A single double
//! operand makes the whole series double; its elements are rounded to the
//! larger number of decimal places of `start` and `step`, so `0 1 0.1`
//! reads `0.0 0.1 ... 1.0` instead of accumulating binary error.
//!
//! # Registered operations
//!
//! `new` (the `lseq` command), `length`, `index`, `slice` and `reverse`.
//! Slices and reversals are series themselves and never materialize.

use crate::list_ops::lseq;
use lseq_core::{
    AbstractListBuilder, AbstractListProc, InternalRep, ListError, Obj, ObjRef,
    abstract_list_payload, format_double, parse_double, parse_int,
};
use tracing::trace;

/// Kind name reported in diagnostics
pub const ARITH_SERIES_KIND: &str = "arithseries";

/// Decimal places beyond which doubles are used as is
const MAX_PRECISION: u32 = 17;

/// A numeric operand of a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Double(f64),
}

impl Number {
    /// Read a number from any value, keeping integers integral
    pub fn from_obj(obj: &Obj) -> Result<Self, ListError> {
        match *obj.rep() {
            InternalRep::Int(value) => return Ok(Number::Int(value)),
            InternalRep::Double(value) => return Ok(Number::Double(value)),
            _ => {}
        }
        let text = obj.get_string();
        if let Some(value) = parse_int(&text) {
            return Ok(Number::Int(value));
        }
        parse_double(&text)
            .map(Number::Double)
            .ok_or_else(|| ListError::InvalidNumber {
                expected: "number",
                text: text.to_string(),
            })
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Double(value) => value,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Number::Int(_))
    }

    pub fn to_obj(self) -> ObjRef {
        match self {
            Number::Int(value) => Obj::new_int(value),
            Number::Double(value) => Obj::new_double(value),
        }
    }
}

/// Payload of an arithmetic series object
#[derive(Debug, Clone, PartialEq)]
pub enum ArithSeries {
    Int {
        start: i64,
        step: i64,
        len: i64,
    },
    Double {
        start: f64,
        step: f64,
        len: i64,
        precision: u32,
    },
}

impl ArithSeries {
    /// Series from `start` to `end` inclusive
    ///
    /// The default step is `1` counting up and `-1` counting down. A step
    /// pointing away from `end`, or a zero step, gives an empty series.
    pub fn from_range(
        start: Number,
        end: Number,
        step: Option<Number>,
    ) -> Result<Self, ListError> {
        match (start, end, step) {
            (Number::Int(start), Number::Int(end), None) => {
                let step = if start <= end { 1 } else { -1 };
                ArithSeries::int_range(start, end, step)
            }
            (Number::Int(start), Number::Int(end), Some(Number::Int(step))) => {
                ArithSeries::int_range(start, end, step)
            }
            _ => {
                let (start, end) = (start.as_f64(), end.as_f64());
                let step = step.map_or(if start <= end { 1.0 } else { -1.0 }, Number::as_f64);
                ArithSeries::double_range(start, end, step)
            }
        }
    }

    /// Series of `count` elements beginning at `start`; a negative count
    /// means none
    ///
    /// An integer series whose last element would not fit in an `i64` is a
    /// domain error.
    pub fn from_count(
        start: Number,
        count: i64,
        step: Option<Number>,
    ) -> Result<Self, ListError> {
        let len = count.max(0);
        match (start, step.unwrap_or(Number::Int(1))) {
            (Number::Int(start), Number::Int(step)) => {
                let last = start as i128 + (len.max(1) - 1) as i128 * step as i128;
                if i64::try_from(last).is_err() {
                    return Err(integer_overflow());
                }
                Ok(ArithSeries::Int { start, step, len })
            }
            (start, step) => {
                let (start, step) = (start.as_f64(), step.as_f64());
                Ok(ArithSeries::Double {
                    start,
                    step,
                    len,
                    precision: series_precision(start, step),
                })
            }
        }
    }

    fn int_range(start: i64, end: i64, step: i64) -> Result<Self, ListError> {
        let span = end as i128 - start as i128;
        let len = if step == 0 || (span != 0 && (span > 0) != (step > 0)) {
            0
        } else {
            span / step as i128 + 1
        };
        let len = i64::try_from(len).map_err(|_| length_exceeded())?;
        Ok(ArithSeries::Int { start, step, len })
    }

    fn double_range(start: f64, end: f64, step: f64) -> Result<Self, ListError> {
        if !start.is_finite() || !end.is_finite() || !step.is_finite() {
            return Err(ListError::Domain(
                "arithmetic series needs finite numbers".to_string(),
            ));
        }
        let precision = series_precision(start, step);
        let span = end - start;
        let len = if step == 0.0 || (span != 0.0 && (span > 0.0) != (step > 0.0)) {
            0.0
        } else {
            // Count in the decimal grid of the operands so 0.3 / 0.1 is 3
            let scale = 10f64.powi(precision.max(decimal_places(end)) as i32);
            let (scaled_span, scaled_step) = ((span * scale).round(), (step * scale).round());
            if scaled_step != 0.0 && scaled_span.is_finite() {
                (scaled_span / scaled_step).floor() + 1.0
            } else {
                (span / step).floor() + 1.0
            }
        };
        if len >= i64::MAX as f64 {
            return Err(length_exceeded());
        }
        Ok(ArithSeries::Double {
            start,
            step,
            len: len as i64,
            precision,
        })
    }

    pub fn len(&self) -> i64 {
        match self {
            ArithSeries::Int { len, .. } | ArithSeries::Double { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, `None` outside `[0, len)`
    pub fn element(&self, index: i64) -> Option<Number> {
        if !(0..self.len()).contains(&index) {
            return None;
        }
        Some(match *self {
            ArithSeries::Int { start, step, .. } => {
                Number::Int(i64::try_from(start as i128 + index as i128 * step as i128).ok()?)
            }
            ArithSeries::Double {
                start,
                step,
                precision,
                ..
            } => Number::Double(round_to(start + index as f64 * step, precision)),
        })
    }

    /// Inclusive sub-series, clamped to the series
    pub fn slice(&self, from: i64, to: i64) -> ArithSeries {
        let from = from.max(0);
        let to = to.min(self.len() - 1);
        let len = if from > to { 0 } else { to - from + 1 };
        match (self.clone(), self.element(from)) {
            (ArithSeries::Int { step, .. }, Some(Number::Int(first))) => ArithSeries::Int {
                start: first,
                step,
                len,
            },
            (ArithSeries::Double { step, precision, .. }, Some(Number::Double(first))) => {
                ArithSeries::Double {
                    start: first,
                    step,
                    len,
                    precision,
                }
            }
            (ArithSeries::Int { start, step, .. }, _) => ArithSeries::Int { start, step, len },
            (
                ArithSeries::Double {
                    start,
                    step,
                    precision,
                    ..
                },
                _,
            ) => ArithSeries::Double {
                start,
                step,
                len,
                precision,
            },
        }
    }

    /// Same elements, last first
    pub fn reversed(&self) -> Result<ArithSeries, ListError> {
        let last = match self.element(self.len() - 1) {
            Some(last) => last,
            None => return Ok(self.clone()),
        };
        match (self, last) {
            (ArithSeries::Int { step, len, .. }, Number::Int(last)) => {
                let step = if *len == 1 {
                    *step
                } else {
                    step.checked_neg().ok_or_else(integer_overflow)?
                };
                Ok(ArithSeries::Int {
                    start: last,
                    step,
                    len: *len,
                })
            }
            (
                ArithSeries::Double {
                    step,
                    len,
                    precision,
                    ..
                },
                last,
            ) => Ok(ArithSeries::Double {
                start: last.as_f64(),
                step: -step,
                len: *len,
                precision: *precision,
            }),
            (ArithSeries::Int { .. }, Number::Double(_)) => {
                unreachable!("integer series produced a double")
            }
        }
    }
}

fn integer_overflow() -> ListError {
    ListError::Domain("integer overflow in arithmetic series".to_string())
}

fn length_exceeded() -> ListError {
    ListError::Domain("max length of a list exceeded".to_string())
}

/// Digits after the decimal point in the canonical text of `value`
fn decimal_places(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let text = format_double(value);
    let (mantissa, exponent) = match text.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().unwrap_or(0)),
        None => (text.as_str(), 0),
    };
    let fraction = mantissa
        .split_once('.')
        .map_or("", |(_, fraction)| fraction)
        .trim_end_matches('0');
    (fraction.len() as i64 - exponent).clamp(0, MAX_PRECISION as i64) as u32
}

fn series_precision(start: f64, step: f64) -> u32 {
    decimal_places(start).max(decimal_places(step))
}

fn round_to(value: f64, precision: u32) -> f64 {
    if precision >= MAX_PRECISION {
        return value;
    }
    let scale = 10f64.powi(precision as i32);
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() { rounded } else { value }
}

/// Publish `series` as an abstract list object
pub fn new_arith_series_obj(series: ArithSeries) -> ObjRef {
    trace!(series = ?series, "new arithmetic series");
    let built = AbstractListBuilder::new(ARITH_SERIES_KIND, series)
        .with_proc(AbstractListProc::New(lseq))
        .with_proc(AbstractListProc::Length(arith_series_length))
        .with_proc(AbstractListProc::Index(arith_series_index))
        .with_proc(AbstractListProc::Slice(arith_series_slice))
        .with_proc(AbstractListProc::Reverse(arith_series_reverse))
        .build();
    match built {
        Ok(obj) => obj,
        Err(err) => unreachable!("arithmetic series registers every required proc: {}", err),
    }
}

fn arith_series_length(obj: &Obj) -> i64 {
    abstract_list_payload::<ArithSeries>(obj).len()
}

fn arith_series_index(obj: &Obj, index: i64) -> Option<ObjRef> {
    let element = abstract_list_payload::<ArithSeries>(obj).element(index);
    element.map(Number::to_obj)
}

fn arith_series_slice(obj: &Obj, from: i64, to: i64) -> Result<ObjRef, ListError> {
    let slice = abstract_list_payload::<ArithSeries>(obj).slice(from, to);
    Ok(new_arith_series_obj(slice))
}

fn arith_series_reverse(obj: &Obj) -> Result<ObjRef, ListError> {
    let reversed = abstract_list_payload::<ArithSeries>(obj).reversed()?;
    Ok(new_arith_series_obj(reversed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lseq_core::{
        abstract_list_index, abstract_list_length, abstract_list_range, abstract_list_reverse,
        abstract_list_type_name,
    };

    fn int_range(start: i64, end: i64, step: Option<i64>) -> ArithSeries {
        ArithSeries::from_range(Number::Int(start), Number::Int(end), step.map(Number::Int))
            .unwrap()
    }

    fn texts(series: ArithSeries) -> String {
        new_arith_series_obj(series).get_string().to_string()
    }

    #[test]
    fn test_number_from_obj() {
        assert_eq!(Number::from_obj(&Obj::new_string("12")), Ok(Number::Int(12)));
        assert_eq!(Number::from_obj(&Obj::new_string("0x10")), Ok(Number::Int(16)));
        assert_eq!(Number::from_obj(&Obj::new_string("2.5")), Ok(Number::Double(2.5)));
        assert_eq!(Number::from_obj(&Obj::new_double(1.0)), Ok(Number::Double(1.0)));
        assert_eq!(
            Number::from_obj(&Obj::new_string("ten")),
            Err(ListError::InvalidNumber {
                expected: "number",
                text: "ten".to_string()
            })
        );
    }

    #[test]
    fn test_int_range_lengths() {
        assert_eq!(int_range(1, 5, None).len(), 5);
        assert_eq!(int_range(5, 1, None).len(), 5);
        assert_eq!(int_range(1, 10, Some(3)).len(), 4);
        assert_eq!(int_range(3, 3, None).len(), 1);
        assert_eq!(int_range(1, 5, Some(-1)).len(), 0);
        assert_eq!(int_range(1, 5, Some(0)).len(), 0);
    }

    #[test]
    fn test_int_range_overflow() {
        let err = ArithSeries::from_range(Number::Int(i64::MIN), Number::Int(i64::MAX), None)
            .unwrap_err();
        assert_eq!(err, ListError::Domain("max length of a list exceeded".to_string()));
    }

    #[test]
    fn test_extreme_but_representable_range() {
        let series = int_range(i64::MIN, i64::MAX, Some(i64::MAX));
        assert_eq!(series.len(), 3);
        assert_eq!(series.element(2), Some(Number::Int(i64::MAX - 1)));
    }

    #[test]
    fn test_double_series_is_rounded() {
        let series =
            ArithSeries::from_range(Number::Int(0), Number::Int(1), Some(Number::Double(0.1)))
                .unwrap();
        assert_eq!(series.len(), 11);
        assert_eq!(
            texts(series),
            "0.0 0.1 0.2 0.3 0.4 0.5 0.6 0.7 0.8 0.9 1.0"
        );
    }

    #[test]
    fn test_double_length_uses_decimal_grid() {
        let series = ArithSeries::from_range(
            Number::Double(0.0),
            Number::Double(0.3),
            Some(Number::Double(0.1)),
        )
        .unwrap();
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn test_from_count() {
        assert_eq!(texts(ArithSeries::from_count(Number::Int(0), 3, None).unwrap()), "0 1 2");
        assert_eq!(
            texts(ArithSeries::from_count(Number::Int(10), 3, Some(Number::Int(-5))).unwrap()),
            "10 5 0"
        );
        assert!(
            ArithSeries::from_count(Number::Int(0), -4, None)
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            texts(ArithSeries::from_count(Number::Double(1.5), 2, None).unwrap()),
            "1.5 2.5"
        );
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(0.0), 0);
        assert_eq!(decimal_places(1.0), 0);
        assert_eq!(decimal_places(0.25), 2);
        assert_eq!(decimal_places(1e-7), 7);
        assert_eq!(decimal_places(1.5e-7), 8);
        assert_eq!(decimal_places(1e20), 0);
    }

    #[test]
    fn test_registered_procs() {
        let obj = new_arith_series_obj(int_range(1, 10, None));
        assert_eq!(abstract_list_type_name(&obj), Some(ARITH_SERIES_KIND));
        assert_eq!(abstract_list_length(&obj), Ok(10));
        let element = abstract_list_index(&obj, 9).unwrap().unwrap();
        assert_eq!(&*element.get_string(), "10");
        assert!(abstract_list_index(&obj, 10).unwrap().is_none());
        assert!(abstract_list_index(&obj, -1).unwrap().is_none());
    }

    #[test]
    fn test_slice_is_a_series() {
        let obj = new_arith_series_obj(int_range(0, 20, Some(2)));
        let slice = abstract_list_range(&obj, 2, 4).unwrap();
        assert_eq!(abstract_list_type_name(&slice), Some(ARITH_SERIES_KIND));
        assert_eq!(&*slice.get_string(), "4 6 8");

        let clamped = abstract_list_range(&obj, -5, 100).unwrap();
        assert_eq!(abstract_list_length(&clamped), Ok(11));

        let inverted = abstract_list_range(&obj, 4, 2).unwrap();
        assert_eq!(&*inverted.get_string(), "");
    }

    #[test]
    fn test_reverse() {
        let obj = new_arith_series_obj(int_range(1, 10, Some(3)));
        let reversed = abstract_list_reverse(&obj).unwrap();
        assert_eq!(&*reversed.get_string(), "10 7 4 1");

        let doubles = new_arith_series_obj(
            ArithSeries::from_range(Number::Int(0), Number::Int(1), Some(Number::Double(0.25)))
                .unwrap(),
        );
        let reversed = abstract_list_reverse(&doubles).unwrap();
        assert_eq!(&*reversed.get_string(), "1.0 0.75 0.5 0.25 0.0");

        let empty = new_arith_series_obj(int_range(1, 5, Some(0)));
        assert_eq!(&*abstract_list_reverse(&empty).unwrap().get_string(), "");
    }

    #[test]
    fn test_reverse_overflow_is_an_error() {
        let series = ArithSeries::Int {
            start: i64::MAX,
            step: i64::MIN,
            len: 2,
        };
        assert!(matches!(series.reversed(), Err(ListError::Domain(_))));
    }

    #[test]
    fn test_count_series_past_i64_is_an_error() {
        let overflow = ListError::Domain("integer overflow in arithmetic series".to_string());
        assert_eq!(
            ArithSeries::from_count(Number::Int(i64::MAX - 1), 3, None),
            Err(overflow.clone())
        );
        assert_eq!(
            ArithSeries::from_count(Number::Int(0), 3, Some(Number::Int(i64::MAX))),
            Err(overflow.clone())
        );
        assert_eq!(
            ArithSeries::from_count(Number::Int(i64::MIN + 1), 3, Some(Number::Int(-1))),
            Err(overflow)
        );
        // Only the last element matters; a single element never steps
        let single = ArithSeries::from_count(Number::Int(i64::MAX), 1, Some(Number::Int(i64::MAX)));
        assert!(single.is_ok());
        assert!(ArithSeries::from_count(Number::Int(i64::MAX), 0, None).is_ok());
    }

    #[test]
    fn test_count_series_at_i64_limits() {
        let top = ArithSeries::from_count(Number::Int(i64::MAX - 2), 3, None).unwrap();
        assert_eq!(top.element(2), Some(Number::Int(i64::MAX)));
        assert_eq!(
            texts(top.clone()),
            "9223372036854775805 9223372036854775806 9223372036854775807"
        );

        assert_eq!(texts(top.slice(1, 2)), "9223372036854775806 9223372036854775807");
        let reversed = top.reversed().unwrap();
        assert_eq!(
            texts(reversed),
            "9223372036854775807 9223372036854775806 9223372036854775805"
        );

        let wide = ArithSeries::from_count(Number::Int(i64::MIN), 2, Some(Number::Int(i64::MAX)))
            .unwrap();
        assert_eq!(texts(wide), "-9223372036854775808 -1");
    }

    #[test]
    fn test_unrepresentable_element_is_absent() {
        let series = ArithSeries::Int {
            start: i64::MAX,
            step: 1,
            len: 2,
        };
        assert_eq!(series.element(0), Some(Number::Int(i64::MAX)));
        assert_eq!(series.element(1), None);
    }
}
