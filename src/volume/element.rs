//! This module defines the data element API, which enables NRRD
//! volume API implementations to read, write and convert data
//! elements.
use crate::formatter::format_number;
use crate::typedef::NrrdType;
use byteordered::Endianness;
use bytemuck::Pod;
use num_traits::AsPrimitive;
use std::fmt::Debug;

/// Trait type for characterizing a NRRD data element, implemented for
/// primitive numeric types which are used by the crate to represent sample
/// values.
pub trait DataElement: 'static + Sized + Copy + Pod + PartialEq + Debug + AsPrimitive<f64> {
    /// The `type` mapped to the type T
    const DATA_TYPE: NrrdType;

    /// Reverse the byte order of the value.
    fn swap_bytes(self) -> Self;

    /// Convert the value to double precision, possibly losing precision.
    fn to_f64(self) -> f64 {
        self.as_()
    }

    /// Parse a value from its textual form in ASCII encoded data.
    fn parse_ascii(token: &str) -> Option<Self>;

    /// Produce the textual form of the value for ASCII encoded data.
    fn format_ascii(self) -> String;

    /// Transform the given data vector into a vector of data elements.
    fn from_raw_vec(vec: Vec<u8>, endianness: Endianness) -> Vec<Self> {
        let mut out: Vec<Self> = bytemuck::pod_collect_to_vec(&vec);
        if endianness != Endianness::native() {
            for v in &mut out {
                *v = v.swap_bytes();
            }
        }
        out
    }

    /// Append the byte representation of the given elements in the given
    /// byte order.
    fn extend_raw_bytes(data: &[Self], endianness: Endianness, out: &mut Vec<u8>) {
        if endianness == Endianness::native() {
            out.extend_from_slice(bytemuck::cast_slice(data));
        } else {
            for v in data {
                out.extend_from_slice(bytemuck::bytes_of(&v.swap_bytes()));
            }
        }
    }
}

macro_rules! impl_int_element {
    ($($t:ty => $dt:ident),*) => {
        $(
            impl DataElement for $t {
                const DATA_TYPE: NrrdType = NrrdType::$dt;

                fn swap_bytes(self) -> Self {
                    <$t>::swap_bytes(self)
                }

                fn parse_ascii(token: &str) -> Option<Self> {
                    token.parse().ok()
                }

                fn format_ascii(self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_int_element!(
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    i64 => Int64,
    u64 => Uint64
);

impl DataElement for f32 {
    const DATA_TYPE: NrrdType = NrrdType::Float;

    fn swap_bytes(self) -> Self {
        f32::from_bits(self.to_bits().swap_bytes())
    }

    fn parse_ascii(token: &str) -> Option<Self> {
        token.parse().ok()
    }

    fn format_ascii(self) -> String {
        format_number(f64::from(self))
    }
}

impl DataElement for f64 {
    const DATA_TYPE: NrrdType = NrrdType::Double;

    fn swap_bytes(self) -> Self {
        f64::from_bits(self.to_bits().swap_bytes())
    }

    fn parse_ascii(token: &str) -> Option<Self> {
        token.parse().ok()
    }

    fn format_ascii(self) -> String {
        format_number(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_conversion() {
        let raw = vec![0x01, 0x02, 0x03, 0x04];
        assert_eq!(
            u16::from_raw_vec(raw.clone(), Endianness::Big),
            vec![0x0102, 0x0304]
        );
        assert_eq!(
            u16::from_raw_vec(raw.clone(), Endianness::Little),
            vec![0x0201, 0x0403]
        );
        assert_eq!(i8::from_raw_vec(vec![0xff, 1], Endianness::Big), vec![-1, 1]);

        let mut out = Vec::new();
        u16::extend_raw_bytes(&[0x0102, 0x0304], Endianness::Big, &mut out);
        assert_eq!(out, raw);
    }

    #[test]
    fn float_swap() {
        let x = 1.5f64;
        assert_eq!(DataElement::swap_bytes(DataElement::swap_bytes(x)), x);
        let mut out = Vec::new();
        f32::extend_raw_bytes(&[1.], Endianness::Big, &mut out);
        assert_eq!(out, vec![0x3f, 0x80, 0, 0]);
    }

    #[test]
    fn ascii() {
        assert_eq!(i16::parse_ascii("-12"), Some(-12));
        assert_eq!(u8::parse_ascii("256"), None);
        assert_eq!(f32::parse_ascii("0.5"), Some(0.5));
        assert_eq!(0.1f32.format_ascii().parse::<f32>().unwrap(), 0.1);
        assert_eq!(2.0f64.format_ascii(), "2");
    }
}
