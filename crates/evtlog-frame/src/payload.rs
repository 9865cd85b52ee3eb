use std::fmt;

/// Width of the payload area in every packet.
pub const PAYLOAD_SIZE: usize = 4;

/// The format discriminant stored in the packet header.
///
/// Selects how the 4-byte payload area is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadFormat {
    None = 0,
    Bool = 1,
    I8 = 2,
    U8 = 3,
    I16 = 4,
    U16 = 5,
    I32 = 6,
    U32 = 7,
    F32 = 8,
    Str2 = 9,
    Str4 = 10,
}

impl PayloadFormat {
    /// Look up a discriminant. Returns `None` for values no format uses.
    pub fn from_u8(value: u8) -> Option<Self> {
        let format = match value {
            0 => Self::None,
            1 => Self::Bool,
            2 => Self::I8,
            3 => Self::U8,
            4 => Self::I16,
            5 => Self::U16,
            6 => Self::I32,
            7 => Self::U32,
            8 => Self::F32,
            9 => Self::Str2,
            10 => Self::Str4,
            _ => return None,
        };
        Some(format)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Number of payload bytes this format occupies.
    pub fn width(self) -> usize {
        match self {
            Self::None => 0,
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 | Self::Str2 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::Str4 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::F32 => "f32",
            Self::Str2 => "str2",
            Self::Str4 => "str4",
        }
    }
}

/// An event's optional value.
///
/// Each variant fixes the format discriminant it is sent with, so the
/// discriminant and the bytes in the payload area can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
    /// Two characters, zero padded.
    Str2([u8; 2]),
    /// Four characters, zero padded.
    Str4([u8; 4]),
}

impl Payload {
    /// A two-character string payload.
    ///
    /// Copies bytes up to the first NUL or two bytes, whichever comes first.
    /// Shorter input is zero padded; an empty string gives an all-zero payload.
    pub fn str2(s: impl AsRef<[u8]>) -> Self {
        Self::Str2(copy_str(s.as_ref()))
    }

    /// A four-character string payload. Same copy rules as [`Payload::str2`].
    pub fn str4(s: impl AsRef<[u8]>) -> Self {
        Self::Str4(copy_str(s.as_ref()))
    }

    /// Like [`Payload::str2`], but an absent string gives an all-zero payload.
    pub fn str2_opt<S: AsRef<[u8]>>(s: Option<S>) -> Self {
        s.map_or(Self::Str2([0; 2]), |s| Self::str2(s))
    }

    /// Like [`Payload::str4`], but an absent string gives an all-zero payload.
    pub fn str4_opt<S: AsRef<[u8]>>(s: Option<S>) -> Self {
        s.map_or(Self::Str4([0; 4]), |s| Self::str4(s))
    }

    pub fn format(&self) -> PayloadFormat {
        match self {
            Self::None => PayloadFormat::None,
            Self::Bool(_) => PayloadFormat::Bool,
            Self::I8(_) => PayloadFormat::I8,
            Self::U8(_) => PayloadFormat::U8,
            Self::I16(_) => PayloadFormat::I16,
            Self::U16(_) => PayloadFormat::U16,
            Self::I32(_) => PayloadFormat::I32,
            Self::U32(_) => PayloadFormat::U32,
            Self::F32(_) => PayloadFormat::F32,
            Self::Str2(_) => PayloadFormat::Str2,
            Self::Str4(_) => PayloadFormat::Str4,
        }
    }

    /// Serialise into the payload area. Bytes past the format's width are zero.
    pub fn to_wire(&self) -> (PayloadFormat, [u8; PAYLOAD_SIZE]) {
        let mut data = match *self {
            Self::None => [0u8; PAYLOAD_SIZE],
            Self::Bool(v) => u32::from(v).to_le_bytes(),
            Self::I8(v) => i32::from(v).to_le_bytes(),
            Self::U8(v) => u32::from(v).to_le_bytes(),
            Self::I16(v) => i32::from(v).to_le_bytes(),
            Self::U16(v) => u32::from(v).to_le_bytes(),
            Self::I32(v) => v.to_le_bytes(),
            Self::U32(v) => v.to_le_bytes(),
            Self::F32(v) => v.to_bits().to_le_bytes(),
            Self::Str2([a, b]) => [a, b, 0, 0],
            Self::Str4(s) => s,
        };
        let format = self.format();
        data[format.width()..].fill(0);
        (format, data)
    }

    /// Interpret a payload area according to a raw discriminant.
    ///
    /// Total: unknown discriminants yield [`Payload::None`].
    pub fn from_wire(format: u8, data: [u8; PAYLOAD_SIZE]) -> Self {
        let Some(format) = PayloadFormat::from_u8(format) else {
            return Self::None;
        };
        match format {
            PayloadFormat::None => Self::None,
            PayloadFormat::Bool => Self::Bool(data[0] != 0),
            PayloadFormat::I8 => Self::I8(i8::from_le_bytes([data[0]])),
            PayloadFormat::U8 => Self::U8(data[0]),
            PayloadFormat::I16 => Self::I16(i16::from_le_bytes([data[0], data[1]])),
            PayloadFormat::U16 => Self::U16(u16::from_le_bytes([data[0], data[1]])),
            PayloadFormat::I32 => Self::I32(i32::from_le_bytes(data)),
            PayloadFormat::U32 => Self::U32(u32::from_le_bytes(data)),
            PayloadFormat::F32 => Self::F32(f32::from_bits(u32::from_le_bytes(data))),
            PayloadFormat::Str2 => Self::Str2([data[0], data[1]]),
            PayloadFormat::Str4 => Self::Str4(data),
        }
    }

    /// The text of a string payload, up to the first NUL.
    pub fn as_text(&self) -> Option<String> {
        let bytes: &[u8] = match self {
            Self::Str2(s) => s,
            Self::Str4(s) => s,
            _ => return None,
        };
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

fn copy_str<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    for (dst, &byte) in out.iter_mut().zip(src.iter().take_while(|&&b| b != 0)) {
        *dst = byte;
    }
    out
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "-"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::Str2(_) | Self::Str4(_) => {
                write!(f, "{:?}", self.as_text().unwrap_or_default())
            }
        }
    }
}

macro_rules! payload_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

payload_from! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    f32 => F32,
    [u8; 2] => Str2,
    [u8; 4] => Str4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_match_wire_values() {
        for value in 0..=10u8 {
            let format = PayloadFormat::from_u8(value).unwrap();
            assert_eq!(format.as_u8(), value);
        }
        assert_eq!(PayloadFormat::from_u8(11), None);
        assert_eq!(PayloadFormat::from_u8(0xFF), None);
    }

    #[test]
    fn widths_fit_payload_area() {
        for value in 0..=10u8 {
            let format = PayloadFormat::from_u8(value).unwrap();
            assert!(format.width() <= PAYLOAD_SIZE);
        }
    }

    #[test]
    fn none_is_all_zero() {
        assert_eq!(Payload::None.to_wire(), (PayloadFormat::None, [0; 4]));
    }

    #[test]
    fn integers_are_little_endian() {
        assert_eq!(Payload::U16(0x0201).to_wire().1, [0x01, 0x02, 0, 0]);
        assert_eq!(Payload::I16(-2).to_wire().1, [0xFE, 0xFF, 0, 0]);
        assert_eq!(
            Payload::U32(0x0403_0201).to_wire().1,
            [0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(Payload::I8(-1).to_wire().1, [0xFF, 0, 0, 0]);
    }

    #[test]
    fn float_bits_survive() {
        let (_, data) = Payload::F32(f32::NAN).to_wire();
        let Payload::F32(back) = Payload::from_wire(PayloadFormat::F32.as_u8(), data) else {
            panic!("expected f32");
        };
        assert_eq!(back.to_bits(), f32::NAN.to_bits());
    }

    #[test]
    fn bool_decodes_any_nonzero_as_true() {
        assert_eq!(
            Payload::from_wire(PayloadFormat::Bool.as_u8(), [0x80, 0, 0, 0]),
            Payload::Bool(true)
        );
        assert_eq!(Payload::Bool(true).to_wire().1, [1, 0, 0, 0]);
    }

    #[test]
    fn strings_pad_and_truncate() {
        assert_eq!(Payload::str4("AB"), Payload::Str4(*b"AB\0\0"));
        assert_eq!(Payload::str4("ABCDEF"), Payload::Str4(*b"ABCD"));
        assert_eq!(Payload::str4(""), Payload::Str4([0; 4]));
        assert_eq!(Payload::str2("XYZ"), Payload::Str2(*b"XY"));
        assert_eq!(Payload::str4(b"A\0CD"), Payload::Str4(*b"A\0\0\0"));
    }

    #[test]
    fn absent_strings_are_all_zero() {
        assert_eq!(Payload::str4_opt(None::<&str>), Payload::Str4([0; 4]));
        assert_eq!(Payload::str2_opt(None::<&str>), Payload::Str2([0; 2]));
        assert_eq!(Payload::str4_opt(Some("RUN")), Payload::Str4(*b"RUN\0"));
        assert_eq!(
            Payload::str4_opt(None::<&str>).to_wire(),
            (PayloadFormat::Str4, [0; 4])
        );
    }

    #[test]
    fn narrow_values_leave_rest_of_area_zero() {
        assert_eq!(Payload::I16(i16::MIN).to_wire().1, [0x00, 0x80, 0, 0]);
        assert_eq!(Payload::I8(-128).to_wire().1, [0x80, 0, 0, 0]);
        assert_eq!(Payload::Bool(false).to_wire().1, [0; 4]);
        assert_eq!(Payload::str2("ab").to_wire().1, *b"ab\0\0");
    }

    #[test]
    fn text_stops_at_nul() {
        assert_eq!(Payload::str4("OK").as_text().as_deref(), Some("OK"));
        assert_eq!(Payload::U8(1).as_text(), None);
    }

    #[test]
    fn unknown_format_projects_to_none() {
        assert_eq!(Payload::from_wire(11, [1, 2, 3, 4]), Payload::None);
        assert_eq!(Payload::from_wire(0x0F, [0xFF; 4]), Payload::None);
    }

    #[test]
    fn str2_ignores_trailing_area() {
        assert_eq!(
            Payload::from_wire(PayloadFormat::Str2.as_u8(), *b"HIJK"),
            Payload::Str2(*b"HI")
        );
    }

    #[test]
    fn display() {
        assert_eq!(Payload::None.to_string(), "-");
        assert_eq!(Payload::I16(-5).to_string(), "-5");
        assert_eq!(Payload::str4("RUN").to_string(), "\"RUN\"");
    }

    #[test]
    fn from_primitives() {
        assert_eq!(Payload::from(7u8), Payload::U8(7));
        assert_eq!(Payload::from(-7i32), Payload::I32(-7));
        assert_eq!(Payload::from(true), Payload::Bool(true));
        assert_eq!(Payload::from(*b"ab"), Payload::Str2(*b"ab"));
    }
}
