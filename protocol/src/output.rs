//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::{CodecError, CodecResult};
use bytes::{BufMut, Bytes, BytesMut};

/// Bounded accumulator for data headed to the terminal driver.
#[derive(Clone, Debug)]
pub struct OutputBuffer {
    buffer: BytesMut,
    capacity: usize,
}

impl OutputBuffer {
    /// Creates an empty buffer that holds at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends one byte, failing with [`CodecError::OutputFull`] at capacity.
    pub fn put(&mut self, byte: u8) -> CodecResult<()> {
        if self.buffer.len() >= self.capacity {
            return Err(CodecError::OutputFull {
                capacity: self.capacity,
            });
        }
        self.buffer.put_u8(byte);
        Ok(())
    }

    /// Bytes that can still be appended.
    pub fn remaining(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    /// Bytes currently buffered.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered bytes, oldest first.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Removes and returns everything buffered.
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Discards everything buffered.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_until_full() {
        let mut output = OutputBuffer::with_capacity(2);
        assert!(output.put(b'a').is_ok());
        assert!(output.put(b'b').is_ok());
        assert_eq!(output.remaining(), 0);
        assert_eq!(
            output.put(b'c'),
            Err(CodecError::OutputFull { capacity: 2 })
        );
        assert_eq!(output.as_slice(), b"ab");
    }

    #[test]
    fn test_take_resets_capacity() {
        let mut output = OutputBuffer::with_capacity(4);
        output.put(b'x').unwrap();
        output.put(b'y').unwrap();
        assert_eq!(output.take(), Bytes::from_static(b"xy"));
        assert!(output.is_empty());
        assert_eq!(output.remaining(), 4);
    }
}
