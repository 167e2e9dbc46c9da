//! Built-in compression on top of `miniz_oxide`.
//!
//! `miniz_oxide` provides the DEFLATE and zlib streams; gzip is the RFC 1952
//! member format wrapped around raw DEFLATE, with `crc32fast` computing the
//! trailer checksum.

use alloc::format;
use alloc::vec::Vec;

use miniz_oxide::deflate::{compress_to_vec, compress_to_vec_zlib};
use miniz_oxide::inflate::{DecompressError, decompress_to_vec, decompress_to_vec_zlib};

use super::{Algorithm, Compression, Error};

const LEVEL: u8 = 6;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const METHOD_DEFLATE: u8 = 0x08;
const GZIP_HEADER_LEN: usize = 10;
const GZIP_TRAILER_LEN: usize = 8;

// Flag bits in header byte 3
const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

pub(super) static ZLIB: Zlib = Zlib;

/// gzip/deflate capability backed by `miniz_oxide`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zlib;

impl Compression for Zlib {
    fn compress(&self, data: &[u8], algorithm: Algorithm) -> Vec<u8> {
        match algorithm {
            Algorithm::Gzip => gzip_compress(data),
            Algorithm::Deflate => compress_to_vec_zlib(data, LEVEL),
        }
    }

    fn decompress(&self, data: &[u8], algorithm: Algorithm) -> Result<Vec<u8>, Error> {
        match algorithm {
            Algorithm::Gzip => gzip_decompress(data),
            // Some servers send raw DEFLATE under this name.
            Algorithm::Deflate => decompress_to_vec_zlib(data)
                .or_else(|_| decompress_to_vec(data))
                .map_err(inflate_error),
        }
    }
}

fn inflate_error(e: DecompressError) -> Error {
    Error::Corrupt(format!("{:?}", e.status))
}

fn gzip_compress(data: &[u8]) -> Vec<u8> {
    let compressed = compress_to_vec(data, LEVEL);
    let mut out = Vec::with_capacity(GZIP_HEADER_LEN + compressed.len() + GZIP_TRAILER_LEN);

    out.extend_from_slice(&GZIP_MAGIC);
    out.push(METHOD_DEFLATE);
    out.push(0); // FLG
    out.extend_from_slice(&[0; 4]); // MTIME
    out.push(0); // XFL
    out.push(0xFF); // OS = unknown

    out.extend_from_slice(&compressed);

    out.extend_from_slice(&crc32fast::hash(data).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out
}

fn gzip_decompress(data: &[u8]) -> Result<Vec<u8>, Error> {
    if data.len() < GZIP_HEADER_LEN + GZIP_TRAILER_LEN {
        return Err(Error::Truncated);
    }
    if data[..2] != GZIP_MAGIC || data[2] != METHOD_DEFLATE {
        return Err(Error::BadHeader);
    }

    let flags = data[3];
    let mut pos = GZIP_HEADER_LEN;

    if flags & FEXTRA != 0 {
        let xlen = data.get(pos..pos + 2).ok_or(Error::Truncated)?;
        pos += 2 + u16::from_le_bytes([xlen[0], xlen[1]]) as usize;
    }
    if flags & FNAME != 0 {
        pos = skip_zero_terminated(data, pos)?;
    }
    if flags & FCOMMENT != 0 {
        pos = skip_zero_terminated(data, pos)?;
    }
    if flags & FHCRC != 0 {
        pos += 2;
    }

    let trailer_start = data.len() - GZIP_TRAILER_LEN;
    if pos > trailer_start {
        return Err(Error::Truncated);
    }

    let trailer = &data[trailer_start..];
    let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let expected_len = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

    let decompressed = decompress_to_vec(&data[pos..trailer_start]).map_err(inflate_error)?;

    if crc32fast::hash(&decompressed) != expected_crc {
        return Err(Error::ChecksumMismatch);
    }
    if decompressed.len() as u32 != expected_len {
        return Err(Error::LengthMismatch);
    }
    Ok(decompressed)
}

fn skip_zero_terminated(data: &[u8], from: usize) -> Result<usize, Error> {
    let rest = data.get(from..).ok_or(Error::Truncated)?;
    let end = rest.iter().position(|&b| b == 0).ok_or(Error::Truncated)?;
    Ok(from + end + 1)
}
