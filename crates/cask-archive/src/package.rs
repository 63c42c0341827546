use flate2::Compression;
use flate2::write::GzEncoder;

use crate::error::Result;

/// Builds a gzip-compressed tarball holding the product binary plus any
/// extra files, in the order given.
///
/// The binary is stored mode 0755, extra files mode 0644. Timestamps are
/// zeroed so packaging the same inputs yields identical bytes.
pub fn package_binary(binary_name: &str, binary: &[u8], extra: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut tarball = tar::Builder::new(encoder);

    append(&mut tarball, binary_name, binary, 0o755)?;
    for (name, data) in extra {
        append(&mut tarball, name, data, 0o644)?;
    }

    let encoder = tarball.into_inner()?;
    Ok(encoder.finish()?)
}

fn append<W: std::io::Write>(
    tarball: &mut tar::Builder<W>,
    name: &str,
    data: &[u8],
    mode: u32,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(mode);
    header.set_mtime(0);
    tarball.append_data(&mut header, name, data)?;
    Ok(())
}
