//! Component F (part 3): `DataView`, an explicit-endianness byte-level
//! window onto an `ArrayBuffer`.

use super::array_buffer::ArrayBufferData;
use super::byte_order::ByteOrderPod;
use super::JsObject;
use crate::error::{JsNativeError, JsResult};
use crate::value::JsValue;

pub struct DataViewData {
    pub buffer: JsObject,
    pub byte_offset: usize,
    pub byte_length: usize,
}

pub fn new_data_view(buffer: JsObject, byte_offset: usize, byte_length: usize, proto: Option<JsObject>) -> JsObject {
    JsObject::from_data(
        proto,
        super::ObjectKind::DataView(DataViewData {
            buffer,
            byte_offset,
            byte_length,
        }),
    )
}

fn bounds_check(view: &DataViewData, offset: usize, size: usize) -> JsResult<std::ops::Range<usize>> {
    if offset + size > view.byte_length {
        return Err(JsNativeError::range()
            .with_message("DataView offset is outside the bounds of the buffer")
            .into());
    }
    let start = view.byte_offset + offset;
    Ok(start..start + size)
}

macro_rules! get_method {
    ($name:ident, $ty:ty, $size:expr) => {
        pub fn $name(obj: &JsObject, offset: usize, little_endian: bool) -> JsResult<JsValue> {
            let data_ref = obj.borrow();
            let view = match &data_ref.kind {
                super::ObjectKind::DataView(v) => v,
                _ => return Err(JsNativeError::typ().with_message("not a DataView").into()),
            };
            let range = bounds_check(view, offset, $size)?;
            let buffer = view.buffer.clone();
            drop(data_ref);
            let buf_ref = buffer.borrow();
            let bytes: &[u8] = match &buf_ref.kind {
                super::ObjectKind::ArrayBuffer(ArrayBufferData { data }) => &data[range],
                _ => return Err(JsNativeError::typ().with_message("detached buffer").into()),
            };
            let value = <$ty>::from_bytes_ordered(bytes, little_endian);
            Ok(JsValue::number(value as f64))
        }
    };
}

macro_rules! set_method {
    ($name:ident, $ty:ty, $size:expr) => {
        pub fn $name(obj: &JsObject, offset: usize, value: f64, little_endian: bool) -> JsResult<()> {
            let data_ref = obj.borrow();
            let view = match &data_ref.kind {
                super::ObjectKind::DataView(v) => v,
                _ => return Err(JsNativeError::typ().with_message("not a DataView").into()),
            };
            let range = bounds_check(view, offset, $size)?;
            let buffer = view.buffer.clone();
            drop(data_ref);
            let casted = value as $ty;
            let bytes = casted.to_bytes_ordered(little_endian);
            let mut buf_ref = buffer.borrow_mut();
            if let super::ObjectKind::ArrayBuffer(ArrayBufferData { data }) = &mut buf_ref.kind {
                data[range].copy_from_slice(&bytes);
            }
            Ok(())
        }
    };
}

get_method!(get_int8, i8, 1);
get_method!(get_uint8, u8, 1);
get_method!(get_int16, i16, 2);
get_method!(get_uint16, u16, 2);
get_method!(get_int32, i32, 4);
get_method!(get_uint32, u32, 4);
get_method!(get_float32, f32, 4);
get_method!(get_float64, f64, 8);

set_method!(set_int8, i8, 1);
set_method!(set_uint8, u8, 1);
set_method!(set_int16, i16, 2);
set_method!(set_uint16, u16, 2);
set_method!(set_int32, i32, 4);
set_method!(set_uint32, u32, 4);
set_method!(set_float32, f32, 4);
set_method!(set_float64, f64, 8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::array_buffer::new_array_buffer;

    #[test]
    fn endianness_round_trip() {
        let buf = new_array_buffer(4, None);
        let view = new_data_view(buf, 0, 4, None);
        set_int32(&view, 0, 1.0, false).unwrap();
        assert_eq!(get_int32(&view, 0, false).unwrap(), JsValue::number(1.0));
        assert_ne!(get_int32(&view, 0, true).unwrap(), JsValue::number(1.0));
    }

    #[test]
    fn out_of_bounds_is_range_error() {
        let buf = new_array_buffer(2, None);
        let view = new_data_view(buf, 0, 2, None);
        assert!(get_int32(&view, 0, true).is_err());
    }
}
