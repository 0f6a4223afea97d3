use std::io::{self, Read};

/// Sequential byte reader that tracks its position and can push bytes back.
///
/// Every loading stage reads through one `ByteSource`, so error offsets are
/// always absolute offsets into the transducer file.
pub struct ByteSource<R> {
    inner: R,
    pending: Vec<u8>,
    position: u64,
}

impl<R: Read> ByteSource<R> {
    pub fn new(inner: R) -> ByteSource<R> {
        ByteSource {
            inner,
            pending: Vec::new(),
            position: 0,
        }
    }

    /// Number of bytes consumed so far.
    #[inline(always)]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Push bytes back so that the next read returns them first.
    pub fn unread(&mut self, bytes: &[u8]) {
        // `pending` is drained from the back.
        self.pending.extend(bytes.iter().rev());
        self.position -= bytes.len() as u64;
    }

    /// Consume `tag` if the source starts with it; otherwise leave the source
    /// as it was.
    pub fn starts_with(&mut self, tag: &[u8]) -> io::Result<bool> {
        let mut peeked = Vec::with_capacity(tag.len());
        let mut byte = [0u8; 1];

        while peeked.len() < tag.len() {
            match self.read(&mut byte)? {
                0 => break,
                _ => peeked.push(byte[0]),
            }
            if peeked[peeked.len() - 1] != tag[peeked.len() - 1] {
                break;
            }
        }

        if peeked.as_slice() == tag {
            Ok(true)
        } else {
            self.unread(&peeked);
            Ok(false)
        }
    }

    /// Read bytes up to and including the next NUL, returning them without the
    /// NUL. `Ok(None)` means `limit` bytes were read without finding one.
    pub fn read_until_nul(&mut self, limit: usize) -> io::Result<Option<Vec<u8>>> {
        let mut out = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            self.read_exact(&mut byte)?;
            if byte[0] == 0 {
                return Ok(Some(out));
            }
            if out.len() == limit {
                return Ok(None);
            }
            out.push(byte[0]);
        }
    }
}

impl<R: Read> Read for ByteSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let n = if self.pending.is_empty() {
            self.inner.read(buf)?
        } else {
            let mut n = 0;
            while n < buf.len() {
                match self.pending.pop() {
                    Some(b) => {
                        buf[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            n
        };

        self.position += n as u64;
        Ok(n)
    }
}
