//! Explicit-endianness byte reinterpretation shared by [`super::typed_array`]
//! and [`super::data_view`] (§4.F). Punning raw bytes to a numeric type is
//! `bytemuck`'s job; picking which end is most significant is ours.

/// A numeric lane width `DataView`/typed arrays can read or write.
pub trait ByteOrderPod: Sized + Copy {
    fn from_bytes_ordered(bytes: &[u8], little_endian: bool) -> Self;
    fn to_bytes_ordered(self, little_endian: bool) -> Vec<u8>;
}

macro_rules! impl_byte_order_pod_int {
    ($($t:ty),+ $(,)?) => {
        $(
            impl ByteOrderPod for $t {
                fn from_bytes_ordered(bytes: &[u8], little_endian: bool) -> Self {
                    let native: $t = bytemuck::pod_read_unaligned(bytes);
                    if little_endian == cfg!(target_endian = "little") {
                        native
                    } else {
                        native.swap_bytes()
                    }
                }

                fn to_bytes_ordered(self, little_endian: bool) -> Vec<u8> {
                    let ordered = if little_endian == cfg!(target_endian = "little") {
                        self
                    } else {
                        self.swap_bytes()
                    };
                    bytemuck::bytes_of(&ordered).to_vec()
                }
            }
        )+
    };
}

impl_byte_order_pod_int!(i8, u8, i16, u16, i32, u32, i64, u64);

macro_rules! impl_byte_order_pod_float {
    ($t:ty, $bits:ty) => {
        impl ByteOrderPod for $t {
            fn from_bytes_ordered(bytes: &[u8], little_endian: bool) -> Self {
                let bits = <$bits>::from_bytes_ordered(bytes, little_endian);
                Self::from_bits(bits)
            }

            fn to_bytes_ordered(self, little_endian: bool) -> Vec<u8> {
                self.to_bits().to_bytes_ordered(little_endian)
            }
        }
    };
}

impl_byte_order_pod_float!(f32, u32);
impl_byte_order_pod_float!(f64, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_both_endiannesses() {
        let bytes = 0x1234_5678_u32.to_bytes_ordered(true);
        assert_eq!(u32::from_bytes_ordered(&bytes, true), 0x1234_5678);
        let bytes = 0x1234_5678_u32.to_bytes_ordered(false);
        assert_eq!(u32::from_bytes_ordered(&bytes, false), 0x1234_5678);
        assert_ne!(
            u32::from_bytes_ordered(&bytes, true),
            0x1234_5678,
        );
    }

    #[test]
    fn float_bit_pattern_preserved() {
        let bytes = 1.5_f64.to_bytes_ordered(true);
        assert_eq!(f64::from_bytes_ordered(&bytes, true), 1.5);
    }
}
