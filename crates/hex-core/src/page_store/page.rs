/// One page-aligned window of the backing file.
///
/// The last page of a file may be shorter than the configured page size.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub offset: u64,
    pub data: Box<[u8]>,
}
