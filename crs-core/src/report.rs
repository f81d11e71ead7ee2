use crate::container::header::ArchiveHeader;
use crate::container::index::{ENTRY_SIZE, IndexTable};
use crate::error::Result;
use crate::util::dostime;
use std::fs;
use std::path::Path;

/// Write the human-readable companion log for one patched archive: index
/// summary, decoded header timestamps, and one line per retained entry.
pub fn write_log(path: &Path, table: &IndexTable, header: &ArchiveHeader) -> Result<()> {
    fs::write(path, render(table, header))?;
    Ok(())
}

fn render(table: &IndexTable, header: &ArchiveHeader) -> String {
    let count = table.entries.len();
    let index_size = count * ENTRY_SIZE;
    let (hour, minute, second) = dostime::unpack_time(header.dos_time);
    let (year, month, day) = dostime::unpack_date(header.dos_date);
    let time_hex = header.dos_time.to_le_bytes();
    let date_hex = header.dos_date.to_le_bytes();

    let mut lines = vec![
        "Generated index summary".to_string(),
        "------------------------".to_string(),
        format!("Number of files: {count}"),
        format!("Index size: {index_size} bytes (0x{index_size:04X})"),
        format!(
            "MS-DOS Time: {hour:02}:{minute:02}:{second:02} (HEX: {:02X} {:02X})",
            time_hex[0], time_hex[1]
        ),
        format!(
            "MS-DOS Date: {year}-{month:02}-{day:02} (HEX: {:02X} {:02X})",
            date_hex[0], date_hex[1]
        ),
        String::new(),
    ];

    for (i, (entry, &original)) in table.entries.iter().zip(&table.positions).enumerate() {
        let adjusted = original + table.base_offset;
        lines.push(format!(
            "[{i}] Original offset: 0x{original:06X} → Adjusted offset: 0x{adjusted:06X} → \
             Name HEX: {} → ASCII: {}",
            hex::encode_upper(entry.encode()),
            display_name(&entry.encode()),
        ));
    }

    lines.join("\n")
}

/// Best-effort rendering of a record's name bytes for the log. Display only;
/// never feeds back into comparison or offset logic.
fn display_name(record: &[u8]) -> String {
    let name = match record.iter().position(|&b| b == 0) {
        Some(nul) => &record[..nul],
        None => record,
    };
    if name.is_ascii() {
        name.iter().map(|&b| b as char).collect()
    } else {
        "NON-PRINTABLE NAME".to_string()
    }
}
