mod test_interop;

#[cfg(test)]
use std::{env::current_dir, fs::File, io::Read};

#[cfg(test)]
use crate::binary::trailer::Trailer;

/// Read a file from `test_data/bplist`
#[cfg(test)]
pub(crate) fn fixture(name: &str) -> Vec<u8> {
    let path = current_dir()
        .unwrap()
        .as_path()
        .join("test_data/bplist")
        .join(name);
    let mut file = File::open(path).unwrap();
    let mut bytes = vec![];
    file.read_to_end(&mut bytes).unwrap();
    bytes
}

/// Build a document from raw objects, using 1-byte references and 1-byte offsets, rooted at object 0
#[cfg(test)]
pub(crate) fn document(objects: &[&[u8]]) -> Vec<u8> {
    let mut stream = b"bplist00".to_vec();
    let mut offsets = vec![];
    for object in objects {
        offsets.push(stream.len() as u8);
        stream.extend_from_slice(object);
    }
    let offset_table_start = stream.len() as u64;
    stream.extend_from_slice(&offsets);

    let trailer = Trailer {
        offset_int_size: 1,
        object_ref_size: 1,
        num_objects: objects.len() as u64,
        top_object: 0,
        offset_table_start,
    };
    stream.extend_from_slice(&trailer.to_bytes());
    stream
}
