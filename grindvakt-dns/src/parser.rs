//! ## grindvakt-dns::parser
//! A compact DNS message parser covering exactly what connection tracking
//! needs: response detection, the question name, and A/AAAA/CNAME answer
//! records, including compressed names.

use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;

/// Errors that can occur while parsing a DNS message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DnsParseError {
    #[error("insufficient data for a DNS message")]
    Truncated,
    #[error("message is a query, not a response")]
    NotAResponse,
    #[error("malformed name at offset {0}")]
    BadName(usize),
}

/// Payload of one answer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    /// Record types connection tracking has no use for.
    Other,
}

/// One answer resource record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Owner name the record answers for.
    pub name: String,
    pub data: AnswerData,
}

/// A parsed DNS response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsResponse {
    /// Name from the first question section entry, when present.
    pub query: Option<String>,
    pub answers: Vec<Answer>,
}

const HEADER_LEN: usize = 12;

// Compression pointers may chain; cap the hops so a malicious message
// cannot loop the parser.
const MAX_POINTER_HOPS: usize = 16;

/// Parse a DNS response message.
///
/// Queries are rejected with [`DnsParseError::NotAResponse`] so the caller
/// falls through to full connection resolution.
pub fn parse_response(data: &[u8]) -> Result<DnsResponse, DnsParseError> {
    if data.len() < HEADER_LEN {
        return Err(DnsParseError::Truncated);
    }

    let flags = u16::from_be_bytes([data[2], data[3]]);
    if flags & 0x8000 == 0 {
        return Err(DnsParseError::NotAResponse);
    }
    let qdcount = u16::from_be_bytes([data[4], data[5]]);
    let ancount = u16::from_be_bytes([data[6], data[7]]);

    let mut offset = HEADER_LEN;
    let mut query = None;
    for _ in 0..qdcount {
        let (name, next) = read_name(data, offset)?;
        if query.is_none() {
            query = Some(name);
        }
        // qtype + qclass
        offset = next + 4;
        if offset > data.len() {
            return Err(DnsParseError::Truncated);
        }
    }

    let mut answers = Vec::with_capacity(ancount as usize);
    for _ in 0..ancount {
        let (name, next) = read_name(data, offset)?;
        let header = data
            .get(next..next + 10)
            .ok_or(DnsParseError::Truncated)?;
        let rtype = u16::from_be_bytes([header[0], header[1]]);
        let rdlen = u16::from_be_bytes([header[8], header[9]]) as usize;
        let rdata_start = next + 10;
        let rdata = data
            .get(rdata_start..rdata_start + rdlen)
            .ok_or(DnsParseError::Truncated)?;

        let data_field = match rtype {
            1 if rdlen == 4 => {
                AnswerData::A(Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3]))
            }
            28 if rdlen == 16 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(rdata);
                AnswerData::Aaaa(Ipv6Addr::from(octets))
            }
            5 => AnswerData::Cname(read_name(data, rdata_start)?.0),
            _ => AnswerData::Other,
        };

        answers.push(Answer {
            name,
            data: data_field,
        });
        offset = rdata_start + rdlen;
    }

    Ok(DnsResponse { query, answers })
}

/// Read a possibly-compressed name starting at `start`; returns the dotted
/// name and the offset just past the name at its original position.
fn read_name(data: &[u8], start: usize) -> Result<(String, usize), DnsParseError> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = start;
    let mut end = None;
    let mut hops = 0;

    loop {
        let len = *data.get(pos).ok_or(DnsParseError::Truncated)? as usize;
        if len == 0 {
            pos += 1;
            break;
        }
        if len & 0xC0 == 0xC0 {
            let low = *data.get(pos + 1).ok_or(DnsParseError::Truncated)?;
            let target = ((len & 0x3F) << 8) | low as usize;
            if end.is_none() {
                end = Some(pos + 2);
            }
            hops += 1;
            if hops > MAX_POINTER_HOPS || target >= pos {
                return Err(DnsParseError::BadName(pos));
            }
            pos = target;
        } else {
            let label = data
                .get(pos + 1..pos + 1 + len)
                .ok_or(DnsParseError::Truncated)?;
            labels.push(String::from_utf8_lossy(label).into_owned());
            pos += 1 + len;
        }
    }

    Ok((labels.join("."), end.unwrap_or(pos)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_name(buf: &mut Vec<u8>, name: &str) {
        for label in name.split('.') {
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
        buf.push(0);
    }

    /// Uncompressed response with one question and the given A answers.
    fn response(query: &str, answers: &[(&str, Ipv4Addr)]) -> Vec<u8> {
        let mut buf = vec![
            0x12, 0x34, // id
            0x81, 0x80, // response, recursion available, no error
            0x00, 0x01, // qdcount
            0x00, answers.len() as u8, // ancount
            0x00, 0x00, // nscount
            0x00, 0x00, // arcount
        ];
        encode_name(&mut buf, query);
        buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]); // A, IN
        for (name, ip) in answers {
            encode_name(&mut buf, name);
            buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]); // A, IN
            buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x3c]); // ttl
            buf.extend_from_slice(&[0x00, 0x04]);
            buf.extend_from_slice(&ip.octets());
        }
        buf
    }

    #[test]
    fn parses_a_plain_answer() {
        let ip: Ipv4Addr = "93.184.216.34".parse().unwrap();
        let message = response("example.com", &[("example.com", ip)]);

        let parsed = parse_response(&message).unwrap();
        assert_eq!(parsed.query.as_deref(), Some("example.com"));
        assert_eq!(parsed.answers.len(), 1);
        assert_eq!(parsed.answers[0].name, "example.com");
        assert_eq!(parsed.answers[0].data, AnswerData::A(ip));
    }

    #[test]
    fn parses_a_compressed_answer_name() {
        let ip: Ipv4Addr = "93.184.216.34".parse().unwrap();
        let mut buf = vec![
            0x12, 0x34, 0x81, 0x80, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
        ];
        encode_name(&mut buf, "example.com");
        buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        // answer name: pointer back to the question name at offset 12
        buf.extend_from_slice(&[0xC0, 0x0C]);
        buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x3c]);
        buf.extend_from_slice(&[0x00, 0x04]);
        buf.extend_from_slice(&ip.octets());

        let parsed = parse_response(&buf).unwrap();
        assert_eq!(parsed.answers[0].name, "example.com");
        assert_eq!(parsed.answers[0].data, AnswerData::A(ip));
    }

    #[test]
    fn rejects_queries() {
        let mut message = response("example.com", &[]);
        message[2] = 0x01; // clear the QR bit
        assert_eq!(
            parse_response(&message),
            Err(DnsParseError::NotAResponse)
        );
    }

    #[test]
    fn rejects_truncated_messages() {
        let message = response("example.com", &[("example.com", Ipv4Addr::LOCALHOST)]);
        assert!(parse_response(&message[..message.len() - 2]).is_err());
        assert_eq!(parse_response(&[0u8; 4]), Err(DnsParseError::Truncated));
    }

    #[test]
    fn pointer_loops_are_rejected() {
        let mut buf = vec![
            0x12, 0x34, 0x81, 0x80, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        // question name pointing at itself
        buf.extend_from_slice(&[0xC0, 0x0C]);
        buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        assert!(matches!(
            parse_response(&buf),
            Err(DnsParseError::BadName(_))
        ));
    }
}
