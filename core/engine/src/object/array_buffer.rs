//! Component F (part 2): the raw byte store backing typed arrays and
//! `DataView`s.

use super::JsObject;

pub struct ArrayBufferData {
    pub data: Vec<u8>,
}

impl ArrayBufferData {
    pub fn byte_length(&self) -> usize {
        self.data.len()
    }
}

pub fn new_array_buffer(byte_length: usize, proto: Option<JsObject>) -> JsObject {
    JsObject::from_data(
        proto,
        super::ObjectKind::ArrayBuffer(ArrayBufferData {
            data: vec![0u8; byte_length],
        }),
    )
}

/// `ArrayBuffer.prototype.slice`: copies, it does not alias (§4.F).
pub fn slice(obj: &JsObject, begin: usize, end: usize, proto: Option<JsObject>) -> JsObject {
    let data_ref = obj.borrow();
    let bytes = match &data_ref.kind {
        super::ObjectKind::ArrayBuffer(buf) => buf.data[begin.min(buf.data.len())..end.min(buf.data.len())].to_vec(),
        _ => Vec::new(),
    };
    drop(data_ref);
    JsObject::from_data(proto, super::ObjectKind::ArrayBuffer(ArrayBufferData { data: bytes }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_copies_independently() {
        let buf = new_array_buffer(4, None);
        if let super::super::ObjectKind::ArrayBuffer(data) = &mut buf.borrow_mut().kind {
            data.data.copy_from_slice(&[1, 2, 3, 4]);
        }
        let copy = slice(&buf, 1, 3, None);
        if let super::super::ObjectKind::ArrayBuffer(data) = &mut buf.borrow_mut().kind {
            data.data[1] = 99;
        }
        match &copy.borrow().kind {
            super::super::ObjectKind::ArrayBuffer(data) => assert_eq!(data.data, vec![2, 3]),
            _ => unreachable!(),
        }
    }
}
