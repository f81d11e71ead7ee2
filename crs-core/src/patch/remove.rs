use crate::scan;

/// A block span deleted from the archive, with the signature that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedBlock {
    pub start: usize,
    pub end: usize,
    pub signature: Vec<u8>,
}

/// Delete every block whose bytes contain one of the exclusion signatures.
///
/// Blocks are the half-open spans between consecutive signature matches; the
/// last span runs to the buffer end. The first matching signature wins per
/// span. Instead of deleting spans in place in descending start order, the
/// retained prefix and spans are copied into a fresh buffer; the two
/// strategies produce identical bytes (see tests). Bytes before the first
/// match are always retained.
pub fn remove_blocks(
    data: Vec<u8>,
    positions: &[usize],
    exclude: &[Vec<u8>],
) -> (Vec<u8>, Vec<RemovedBlock>) {
    if exclude.is_empty() || positions.is_empty() {
        return (data, Vec::new());
    }

    let mut removed = Vec::new();
    let mut spans = Vec::with_capacity(positions.len());
    for (i, &start) in positions.iter().enumerate() {
        let end = positions.get(i + 1).copied().unwrap_or(data.len());
        let hit = exclude
            .iter()
            .find(|sig| scan::contains(&data[start..end], sig));
        match hit {
            Some(sig) => removed.push(RemovedBlock {
                start,
                end,
                signature: sig.clone(),
            }),
            None => spans.push((start, end)),
        }
    }

    if removed.is_empty() {
        return (data, removed);
    }

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..positions[0]]);
    for (start, end) in spans {
        out.extend_from_slice(&data[start..end]);
    }
    (out, removed)
}
