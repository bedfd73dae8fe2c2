//! Scalar generators for string, number, integer and boolean schema nodes

use chrono::{DateTime, Utc};
use rand::distributions::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;
use regex_syntax::hir::{Class, ClassBytes, ClassBytesRange, ClassUnicode, ClassUnicodeRange, Hir, HirKind};
use regex_syntax::ParserBuilder;
use serde_json::{Number, Value};

use crate::config::GenerationSettings;
use crate::domain::schema::{IntegerFormat, IntegerSchema, NumberSchema, StringFormat, StringSchema};
use crate::domain::SchemaPath;
use crate::error::{SynthError, SynthResult};

/// Default bounds for `int32` integers without `minimum`/`maximum`
const INT32_RANGE: (f64, f64) = (100_000.0, 9_000_000.0);
/// Default bounds for `int64` and unknown integer formats
const INT64_RANGE: (f64, f64) = (10_000_000_000.0, 500_000_000_000.0);

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct ScalarGenerator<'a> {
    settings: &'a GenerationSettings,
    now: DateTime<Utc>,
}

impl<'a> ScalarGenerator<'a> {
    /// `now` is the timestamp every `date`/`date-time` value is rendered from
    pub fn new(settings: &'a GenerationSettings, now: DateTime<Utc>) -> Self {
        Self { settings, now }
    }

    pub fn string<R: Rng + ?Sized>(
        &self,
        schema: &StringSchema,
        path: &SchemaPath,
        rng: &mut R,
    ) -> SynthResult<Value> {
        if let Some(values) = &schema.enum_values {
            return choose(values, path, rng);
        }

        if let Some(pattern) = &schema.pattern {
            return self.pattern_string(pattern, path, rng).map(Value::String);
        }

        match &schema.format {
            Some(StringFormat::DateTime) => {
                return Ok(Value::String(self.now.format(DATE_TIME_FORMAT).to_string()))
            }
            Some(StringFormat::Date) => return Ok(Value::String(self.now.format(DATE_FORMAT).to_string())),
            Some(StringFormat::Other(format)) => {
                tracing::debug!("No generator for string format '{}' at {}, using letters", format, path);
            }
            None => {}
        }

        let length = self.string_length(schema, path, rng)?;
        let text: String = (0..length)
            .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
            .collect();
        Ok(Value::String(text))
    }

    fn pattern_string<R: Rng + ?Sized>(
        &self,
        pattern: &str,
        path: &SchemaPath,
        rng: &mut R,
    ) -> SynthResult<String> {
        let pattern_error = |reason: String| SynthError::Pattern {
            path: path.to_string(),
            pattern: pattern.to_string(),
            reason,
        };

        // ASCII classes (`\d`, `\w`, `.`) as in ECMA-262 patterns
        let hir = ParserBuilder::new()
            .unicode(false)
            .utf8(false)
            .build()
            .parse(pattern)
            .map_err(|e| pattern_error(e.to_string()))?;
        let generator = rand_regex::Regex::with_hir(generable(hir), self.settings.pattern_max_repeat)
            .map_err(|e| pattern_error(e.to_string()))?;

        let bytes: Vec<u8> = generator.sample(rng);
        String::from_utf8(bytes).map_err(|e| pattern_error(e.to_string()))
    }

    /// Length drawn from `[min, max)`; equal bounds give exactly that length
    fn string_length<R: Rng + ?Sized>(
        &self,
        schema: &StringSchema,
        path: &SchemaPath,
        rng: &mut R,
    ) -> SynthResult<usize> {
        let (min, max) = match (schema.min_length, schema.max_length) {
            (Some(min), Some(max)) if min > max => {
                return Err(unsatisfiable(
                    path,
                    format!("minLength {} exceeds maxLength {}", min, max),
                ))
            }
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, self.settings.string_max_length.max(min)),
            (None, Some(max)) => (self.settings.string_min_length.min(max), max),
            (None, None) => (self.settings.string_min_length, self.settings.string_max_length),
        };

        if min >= max {
            Ok(min)
        } else {
            Ok(rng.gen_range(min..max))
        }
    }

    pub fn number<R: Rng + ?Sized>(
        &self,
        schema: &NumberSchema,
        path: &SchemaPath,
        rng: &mut R,
    ) -> SynthResult<Value> {
        if let Some(values) = &schema.enum_values {
            return choose(values, path, rng);
        }

        let value = match (schema.minimum, schema.maximum) {
            (None, None) => rng.gen::<f64>(),
            (min, max) => {
                let min = min.unwrap_or_else(|| max.unwrap_or_default() - 1.0);
                let max = max.unwrap_or(min + 1.0);
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(unsatisfiable(
                        path,
                        format!("empty number range [{}, {}]", min, max),
                    ));
                }
                if min == max {
                    min
                } else if max - min < f64::MAX / 2.0 {
                    rng.gen_range(min..=max)
                } else {
                    // Width near or past f64::MAX; sample in halves
                    let t: f64 = rng.gen();
                    (2.0 * (min / 2.0 + t * (max / 2.0 - min / 2.0))).clamp(min, max)
                }
            }
        };

        Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| unsatisfiable(path, format!("{} is not a finite number", value)))
    }

    pub fn integer<R: Rng + ?Sized>(
        &self,
        schema: &IntegerSchema,
        path: &SchemaPath,
        rng: &mut R,
    ) -> SynthResult<Value> {
        if let Some(values) = &schema.enum_values {
            return choose(values, path, rng);
        }

        let multiple = schema.multiple_of.unwrap_or(1);
        let (default_min, default_max) = match schema.format {
            Some(IntegerFormat::Int32) => INT32_RANGE,
            _ => INT64_RANGE,
        };

        // A lone bound outside the default range drags the other default along
        let (min, max) = match (schema.minimum, schema.maximum) {
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, default_max.max(min)),
            (None, Some(max)) => (default_min.min(max), max),
            (None, None) => (default_min, default_max),
        };

        let low = (min / multiple as f64).ceil();
        let high = (max / multiple as f64).floor();
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(unsatisfiable(
                path,
                format!("no multiple of {} in [{}, {}]", multiple, min, max),
            ));
        }
        if low < i64::MIN as f64 || high > i64::MAX as f64 {
            return Err(unsatisfiable(
                path,
                format!("[{}, {}] exceeds the 64-bit integer range", min, max),
            ));
        }

        let factor = rng.gen_range(low as i64..=high as i64);
        factor
            .checked_mul(multiple)
            .map(Value::from)
            .ok_or_else(|| unsatisfiable(path, format!("{} * {} overflows", factor, multiple)))
    }

    pub fn boolean<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        Value::Bool(rng.gen())
    }
}

fn choose<R: Rng + ?Sized>(values: &[Value], path: &SchemaPath, rng: &mut R) -> SynthResult<Value> {
    values
        .choose(rng)
        .cloned()
        .ok_or_else(|| unsatisfiable(path, "enum has no values"))
}

/// Drop anchors and word-boundary assertions and narrow byte classes to ASCII.
/// Generated text is always a full match, so the assertions carry no information.
fn generable(hir: Hir) -> Hir {
    match hir.into_kind() {
        HirKind::Empty | HirKind::Look(_) => Hir::empty(),
        HirKind::Literal(literal) => Hir::literal(literal.0),
        HirKind::Class(Class::Unicode(class)) => Hir::class(Class::Unicode(class)),
        HirKind::Class(Class::Bytes(mut class)) => {
            class.intersect(&ClassBytes::new([ClassBytesRange::new(0x00, 0x7F)]));
            let ascii = class
                .ranges()
                .iter()
                .map(|r| ClassUnicodeRange::new(char::from(r.start()), char::from(r.end())));
            Hir::class(Class::Unicode(ClassUnicode::new(ascii)))
        }
        HirKind::Repetition(mut repetition) => {
            repetition.sub = Box::new(generable(*repetition.sub));
            Hir::repetition(repetition)
        }
        HirKind::Capture(mut capture) => {
            capture.sub = Box::new(generable(*capture.sub));
            Hir::capture(capture)
        }
        HirKind::Concat(subs) => Hir::concat(subs.into_iter().map(generable).collect()),
        HirKind::Alternation(subs) => Hir::alternation(subs.into_iter().map(generable).collect()),
    }
}

fn unsatisfiable(path: &SchemaPath, reason: impl Into<String>) -> SynthError {
    SynthError::UnsatisfiableConstraint {
        path: path.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn path() -> SchemaPath {
        SchemaPath::schema("Test").push_property("field")
    }

    #[test]
    fn test_string_enum() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = StringSchema {
            enum_values: Some(vec![json!("a"), json!("b")]),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..50 {
            let value = gen.string(&schema, &path(), &mut rng).unwrap();
            assert!(value == json!("a") || value == json!("b"));
        }
    }

    #[test]
    fn test_string_pattern() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let pattern = "^[A-Z]{3}-[0-9]{4}$";
        let schema = StringSchema {
            pattern: Some(pattern.to_string()),
            ..Default::default()
        };
        let matcher = regex::Regex::new(pattern).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..50 {
            let value = gen.string(&schema, &path(), &mut rng).unwrap();
            assert!(matcher.is_match(value.as_str().unwrap()), "{} does not match", value);
        }
    }

    #[test]
    fn test_invalid_pattern() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = StringSchema {
            pattern: Some("[A-Z".to_string()),
            ..Default::default()
        };
        let err = gen
            .string(&schema, &path(), &mut StdRng::seed_from_u64(3))
            .unwrap_err();
        assert!(matches!(err, SynthError::Pattern { .. }));
    }

    #[test]
    fn test_pattern_classes_are_ascii() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let mut rng = StdRng::seed_from_u64(31);

        for (pattern, check) in [
            (r"^\d{6}$", r"^[0-9]{6}$"),
            (r"^\w{4}$", r"^[0-9A-Za-z_]{4}$"),
            (r"^[^a-z]{3}$", r"^[\x00-\x60\x7B-\x7F]{3}$"),
        ] {
            let schema = StringSchema {
                pattern: Some(pattern.to_string()),
                ..Default::default()
            };
            let matcher = regex::Regex::new(check).unwrap();
            for _ in 0..50 {
                let value = gen.string(&schema, &path(), &mut rng).unwrap();
                let text = value.as_str().unwrap();
                assert!(text.is_ascii(), "{:?} from {} is not ASCII", text, pattern);
                assert!(matcher.is_match(text), "{:?} does not match {}", text, check);
            }
        }
    }

    #[test]
    fn test_dot_stays_valid_text() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = StringSchema {
            pattern: Some("^.{8}$".to_string()),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(32);

        for _ in 0..50 {
            let value = gen.string(&schema, &path(), &mut rng).unwrap();
            let text = value.as_str().unwrap();
            assert_eq!(text.len(), 8);
            assert!(!text.contains('\n'));
        }
    }

    #[test]
    fn test_inner_anchors() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let mut rng = StdRng::seed_from_u64(33);

        let alternation = StringSchema {
            pattern: Some("^[a-z]+$|^[0-9]+$".to_string()),
            ..Default::default()
        };
        let matcher = regex::Regex::new("^[a-z]+$|^[0-9]+$").unwrap();
        for _ in 0..50 {
            let value = gen.string(&alternation, &path(), &mut rng).unwrap();
            assert!(matcher.is_match(value.as_str().unwrap()), "{} does not match", value);
        }

        let grouped = StringSchema {
            pattern: Some("(^abc$)".to_string()),
            ..Default::default()
        };
        assert_eq!(gen.string(&grouped, &path(), &mut rng).unwrap(), json!("abc"));

        let escaped = StringSchema {
            pattern: Some(r"^cost\$$".to_string()),
            ..Default::default()
        };
        assert_eq!(gen.string(&escaped, &path(), &mut rng).unwrap(), json!("cost$"));
    }

    #[test]
    fn test_date_formats_use_clock() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let mut rng = StdRng::seed_from_u64(4);

        let date_time = StringSchema {
            format: Some(StringFormat::DateTime),
            ..Default::default()
        };
        let date = StringSchema {
            format: Some(StringFormat::Date),
            ..Default::default()
        };

        assert_eq!(
            gen.string(&date_time, &path(), &mut rng).unwrap(),
            json!("2024-03-09 14:05:07")
        );
        assert_eq!(gen.string(&date, &path(), &mut rng).unwrap(), json!("2024-03-09"));
    }

    #[test]
    fn test_unknown_format_falls_back_to_letters() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = StringSchema {
            format: Some(StringFormat::Other("email".to_string())),
            ..Default::default()
        };
        let value = gen.string(&schema, &path(), &mut StdRng::seed_from_u64(5)).unwrap();
        let text = value.as_str().unwrap();
        assert!((5..25).contains(&text.len()));
        assert!(text.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_string_length_bounds() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let mut rng = StdRng::seed_from_u64(6);

        let ranged = StringSchema {
            min_length: Some(2),
            max_length: Some(4),
            ..Default::default()
        };
        for _ in 0..50 {
            let len = gen.string(&ranged, &path(), &mut rng).unwrap().as_str().unwrap().len();
            assert!((2..4).contains(&len));
        }

        let exact = StringSchema {
            min_length: Some(3),
            max_length: Some(3),
            ..Default::default()
        };
        let value = gen.string(&exact, &path(), &mut rng).unwrap();
        assert_eq!(value.as_str().unwrap().len(), 3);

        let short = StringSchema {
            max_length: Some(2),
            ..Default::default()
        };
        let value = gen.string(&short, &path(), &mut rng).unwrap();
        assert_eq!(value.as_str().unwrap().len(), 2);
    }

    #[test]
    fn test_string_length_conflict() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = StringSchema {
            min_length: Some(10),
            max_length: Some(2),
            ..Default::default()
        };
        let err = gen.string(&schema, &path(), &mut StdRng::seed_from_u64(7)).unwrap_err();
        assert!(matches!(err, SynthError::UnsatisfiableConstraint { .. }));
    }

    #[test]
    fn test_integer_bounds() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = IntegerSchema {
            format: Some(IntegerFormat::Int32),
            minimum: Some(0.0),
            maximum: Some(10.0),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..100 {
            let value = gen.integer(&schema, &path(), &mut rng).unwrap();
            let n = value.as_i64().unwrap();
            assert!((0..=10).contains(&n));
        }
    }

    #[test]
    fn test_integer_multiple_of() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = IntegerSchema {
            minimum: Some(1.0),
            maximum: Some(20.0),
            multiple_of: Some(5),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..100 {
            let n = gen.integer(&schema, &path(), &mut rng).unwrap().as_i64().unwrap();
            assert!((5..=20).contains(&n));
            assert_eq!(n % 5, 0);
        }
    }

    #[test]
    fn test_integer_format_defaults() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let mut rng = StdRng::seed_from_u64(10);

        let int32 = IntegerSchema {
            format: Some(IntegerFormat::Int32),
            ..Default::default()
        };
        let n = gen.integer(&int32, &path(), &mut rng).unwrap().as_i64().unwrap();
        assert!((100_000..=9_000_000).contains(&n));

        let int64 = IntegerSchema::default();
        let n = gen.integer(&int64, &path(), &mut rng).unwrap().as_i64().unwrap();
        assert!((10_000_000_000..=500_000_000_000).contains(&n));
    }

    #[test]
    fn test_integer_single_bound_moves_default() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let mut rng = StdRng::seed_from_u64(11);

        let low_max = IntegerSchema {
            format: Some(IntegerFormat::Int32),
            maximum: Some(50.0),
            ..Default::default()
        };
        assert_eq!(gen.integer(&low_max, &path(), &mut rng).unwrap(), json!(50));

        let high_min = IntegerSchema {
            format: Some(IntegerFormat::Int32),
            minimum: Some(20_000_000.0),
            ..Default::default()
        };
        assert_eq!(gen.integer(&high_min, &path(), &mut rng).unwrap(), json!(20_000_000));
    }

    #[test]
    fn test_integer_empty_range() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = IntegerSchema {
            minimum: Some(11.0),
            maximum: Some(14.0),
            multiple_of: Some(5),
            ..Default::default()
        };
        let err = gen.integer(&schema, &path(), &mut StdRng::seed_from_u64(12)).unwrap_err();
        assert!(matches!(err, SynthError::UnsatisfiableConstraint { .. }));
    }

    #[test]
    fn test_number_default_and_bounds() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let mut rng = StdRng::seed_from_u64(13);

        let plain = NumberSchema::default();
        for _ in 0..50 {
            let value = gen.number(&plain, &path(), &mut rng).unwrap();
            let x = value.as_f64().unwrap();
            assert!((0.0..1.0).contains(&x));
        }

        let bounded = NumberSchema {
            minimum: Some(2.5),
            maximum: Some(3.5),
            ..Default::default()
        };
        for _ in 0..50 {
            let x = gen.number(&bounded, &path(), &mut rng).unwrap().as_f64().unwrap();
            assert!((2.5..=3.5).contains(&x));
        }

        let only_min = NumberSchema {
            minimum: Some(100.0),
            ..Default::default()
        };
        let x = gen.number(&only_min, &path(), &mut rng).unwrap().as_f64().unwrap();
        assert!((100.0..=101.0).contains(&x));
    }

    #[test]
    fn test_number_is_json_float() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = NumberSchema {
            minimum: Some(4.0),
            maximum: Some(4.0),
            ..Default::default()
        };
        let value = gen.number(&schema, &path(), &mut StdRng::seed_from_u64(14)).unwrap();
        assert!(value.is_f64());
    }

    #[test]
    fn test_number_full_f64_range() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = NumberSchema {
            minimum: Some(-1.7e308),
            maximum: Some(1.7e308),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(15);

        for _ in 0..50 {
            let x = gen.number(&schema, &path(), &mut rng).unwrap().as_f64().unwrap();
            assert!(x.is_finite());
            assert!((-1.7e308..=1.7e308).contains(&x));
        }
    }

    #[test]
    fn test_seeded_output_is_deterministic() {
        let settings = GenerationSettings::default();
        let gen = ScalarGenerator::new(&settings, fixed_now());
        let schema = StringSchema::default();

        let a = gen.string(&schema, &path(), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = gen.string(&schema, &path(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
