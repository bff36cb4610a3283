//! Blob objects: a file's content, stored verbatim with no transformation.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Blob { data }
    }

    pub fn to_payload(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn from_payload(data: &[u8]) -> Blob {
        Blob {
            data: data.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
