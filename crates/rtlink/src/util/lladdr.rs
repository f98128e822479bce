//! Link-layer address text grammar.

/// Longest address the ifreq sockaddr slot can carry.
const MAX_ADDR_LEN: usize = 14;

/// Error type for link-layer address parsing.
#[derive(Debug, thiserror::Error)]
#[error("invalid link-layer address: {0}")]
pub struct LladdrError(String);

pub type Result<T> = std::result::Result<T, LladdrError>;

/// Parse a colon- or dash-separated hex-octet address into raw bytes.
///
/// Length is deliberately not fixed here: the caller compares the result
/// against the byte length the target device reports, so the same grammar
/// serves 6-byte ethernet and longer infiniband-style addresses alike.
pub fn parse(s: &str) -> Result<Vec<u8>> {
    let sep = if s.contains('-') { '-' } else { ':' };

    let mut bytes = Vec::new();
    for part in s.split(sep) {
        if part.is_empty() || part.len() > 2 {
            return Err(LladdrError(s.to_string()));
        }
        let octet = u8::from_str_radix(part, 16).map_err(|_| LladdrError(s.to_string()))?;
        bytes.push(octet);
        if bytes.len() > MAX_ADDR_LEN {
            return Err(LladdrError(s.to_string()));
        }
    }

    Ok(bytes)
}

/// Format raw address bytes as colon-separated hex octets.
pub fn format(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colon_form() {
        let mac = parse("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(mac, vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }

    #[test]
    fn test_parse_dash_form() {
        let mac = parse("aa-bb-cc-dd-ee-ff").unwrap();
        assert_eq!(mac, vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }

    #[test]
    fn test_parse_single_digit_octets() {
        assert_eq!(parse("0:1:a").unwrap(), vec![0x00, 0x01, 0x0a]);
    }

    #[test]
    fn test_parse_does_not_fix_length() {
        // Length policing happens against the device, not here
        assert_eq!(parse("00:11:22:33:44").unwrap().len(), 5);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("aa:bb:").is_err());
        assert!(parse("aa:zz:cc").is_err());
        assert!(parse("aab:cc").is_err());
        let too_long = vec!["ff"; 20].join(":");
        assert!(parse(&too_long).is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(
            format(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            "aa:bb:cc:dd:ee:ff"
        );
        assert_eq!(format(&[0x00]), "00");
    }
}
