//! Reads and writes 1D lookup tables.

use std::io::{BufRead, Error, ErrorKind, Write};

/// Writes a `.spi1d` table with one component per table.
///
/// Between one and three equally long tables are accepted.
pub fn write_spi1d<W: Write>(
    out: &mut W,
    range: (f32, f32),
    tables: &[&[f32]],
) -> std::io::Result<()> {
    let len = tables.first().map(|t| t.len()).unwrap_or(0);
    if tables.is_empty() || tables.len() > 3 || tables.iter().any(|t| t.len() != len) {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "expected one to three equally long tables",
        ));
    }

    out.write_all(b"Version 1\n")?;
    out.write_all(format!("From {:0.7} {:0.7}\n", range.0, range.1).as_bytes())?;
    out.write_all(format!("Length {}\n", len).as_bytes())?;
    out.write_all(format!("Components {}\n", tables.len()).as_bytes())?;
    out.write_all(b"{\n")?;
    for i in 0..len {
        let mut line = String::new();
        for t in tables {
            line.push_str(&format!(" {:0.7}", t[i]));
        }
        out.write_all(format!(" {}\n", line).as_bytes())?;
    }
    out.write_all(b"}\n")?;

    Ok(())
}

/// Writes a `.cube` 1D table.
///
/// `tables` holds either one table, which is used for all three
/// channels, or three equally long tables for red, green and blue.
pub fn write_cube_1d<W: Write>(
    out: &mut W,
    title: &str,
    range: (f32, f32),
    tables: &[&[f32]],
) -> std::io::Result<()> {
    let (r, g, b) = match tables {
        [t] => (*t, *t, *t),
        [r, g, b] if r.len() == g.len() && r.len() == b.len() => (*r, *g, *b),
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "expected one table or three equally long tables",
            ))
        }
    };

    out.write_all(format!("TITLE \"{}\"\n", title).as_bytes())?;
    out.write_all(
        format!(
            "DOMAIN_MIN {:0.7} {:0.7} {:0.7}\n",
            range.0, range.0, range.0
        )
        .as_bytes(),
    )?;
    out.write_all(
        format!(
            "DOMAIN_MAX {:0.7} {:0.7} {:0.7}\n",
            range.1, range.1, range.1
        )
        .as_bytes(),
    )?;
    out.write_all(format!("LUT_1D_SIZE {}\n", r.len()).as_bytes())?;

    for ((r, g), b) in r.iter().zip(g.iter()).zip(b.iter()) {
        out.write_all(format!("{:0.7} {:0.7} {:0.7}\n", r, g, b).as_bytes())?;
    }

    Ok(())
}

/// A 1D table as read from a `.cube` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube1D {
    pub range: (f32, f32),
    pub tables: [Vec<f32>; 3],
}

/// Reads a `.cube` 1D table.  3D tables are rejected.
pub fn read_cube_1d<R: BufRead>(input: R) -> std::io::Result<Cube1D> {
    let invalid = |msg: String| Error::new(ErrorKind::InvalidData, msg);
    let parse_f32 = |s: &str| {
        s.parse::<f32>()
            .map_err(|_| invalid(format!("bad number \"{}\"", s)))
    };

    let mut range = (0.0f32, 1.0f32);
    let mut size = None;
    let mut tables = [Vec::new(), Vec::new(), Vec::new()];

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("TITLE") {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "DOMAIN_MIN" if parts.len() >= 2 => range.0 = parse_f32(parts[1])?,
            "DOMAIN_MAX" if parts.len() >= 2 => range.1 = parse_f32(parts[1])?,
            "LUT_1D_SIZE" if parts.len() == 2 => {
                size = Some(
                    parts[1]
                        .parse::<usize>()
                        .map_err(|_| invalid(format!("bad size \"{}\"", parts[1])))?,
                );
            }
            "LUT_3D_SIZE" => return Err(invalid("3D tables are not supported".into())),
            _ if parts.len() == 3 => {
                for (table, s) in tables.iter_mut().zip(parts.iter()) {
                    table.push(parse_f32(s)?);
                }
            }
            _ => return Err(invalid(format!("unexpected line \"{}\"", line))),
        }
    }

    match size {
        Some(n) if n == tables[0].len() => Ok(Cube1D {
            range: range,
            tables: tables,
        }),
        Some(n) => Err(invalid(format!(
            "expected {} entries, found {}",
            n,
            tables[0].len()
        ))),
        None => Err(invalid("missing LUT_1D_SIZE".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_round_trip() {
        let r = [0.0, 0.25, 1.0];
        let g = [0.0, 0.5, 1.0];
        let b = [0.0, 0.75, 1.0];
        let mut buf = Vec::new();
        write_cube_1d(&mut buf, "test", (0.0, 1.0), &[&r, &g, &b]).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("TITLE \"test\"\n"));
        assert!(text.contains("LUT_1D_SIZE 3\n"));

        let cube = read_cube_1d(&buf[..]).unwrap();
        assert_eq!(cube.range, (0.0, 1.0));
        assert_eq!(cube.tables[0], r.to_vec());
        assert_eq!(cube.tables[1], g.to_vec());
        assert_eq!(cube.tables[2], b.to_vec());
    }

    #[test]
    fn single_table_is_shared() {
        let t = [0.0, 1.0];
        let mut buf = Vec::new();
        write_cube_1d(&mut buf, "mono", (0.0, 1.0), &[&t]).unwrap();
        let cube = read_cube_1d(&buf[..]).unwrap();
        assert_eq!(cube.tables[2], t.to_vec());
    }

    #[test]
    fn mismatched_tables() {
        let mut buf = Vec::new();
        let err = write_cube_1d(&mut buf, "x", (0.0, 1.0), &[&[0.0], &[0.0, 1.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn bad_cube_files() {
        assert!(read_cube_1d(&b"LUT_3D_SIZE 2\n"[..]).is_err());
        assert!(read_cube_1d(&b"LUT_1D_SIZE 2\n0 0 0\n"[..]).is_err());
        assert!(read_cube_1d(&b"0 0 0\n"[..]).is_err());
    }

    #[test]
    fn spi1d_layout() {
        let mut buf = Vec::new();
        write_spi1d(&mut buf, (0.0, 1.0), &[&[0.0, 1.0], &[0.0, 0.5], &[0.0, 0.25]]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Length 2\n"));
        assert!(text.contains("Components 3\n"));
        assert!(text.contains("  1.0000000 0.5000000 0.2500000\n"));

        let mut buf = Vec::new();
        let err = write_spi1d(&mut buf, (0.0, 1.0), &[&[0.0], &[0.0, 1.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(write_spi1d(&mut buf, (0.0, 1.0), &[]).is_err());
    }
}
