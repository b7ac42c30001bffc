use crate::ax100::{Ax100Codec, Ax100Config};
use crate::error::Ax100Error;
use crate::golay;
use bytes::{Buf, BytesMut};

#[derive(Clone, Copy, PartialEq, Eq)]
enum CodecState {
    Sync,
    Data,
}

#[cfg_attr(
    docsrs,
    doc(cfg(any(feature = "async-codec", feature = "tokio-codec")))
)]
/// A Codec used to Encode/Decode AX100 frames from Streams and Sinks.
///
/// This codec locates the Attached Sync Marker in the incoming byte stream,
/// reads the Golay-coded length field that follows it, waits for the
/// declared number of bytes to arrive, then hands the complete frame to the
/// wrapped [`Ax100Codec`]. It requires `syncword` and `length_field` to both
/// be enabled in the `Ax100Config` it is built from — without a length
/// field there is no way to know where one frame ends and the next begins
/// in a byte stream.
pub struct Ax100FrameCodec {
    ax100: Ax100Codec,
    state: CodecState,
}

impl Ax100FrameCodec {
    /// Build a codec around `config`. Panics if `config.syncword` or
    /// `config.length_field` is false, since streaming framing depends on
    /// both.
    pub fn new(config: Ax100Config) -> Self {
        assert!(
            config.syncword && config.length_field,
            "Ax100FrameCodec requires syncword and length_field to be enabled"
        );
        Self {
            ax100: Ax100Codec::new(config),
            state: CodecState::Sync,
        }
    }

    fn find_sync(&self, source: &[u8]) -> Option<usize> {
        source
            .windows(crate::ax100::frame::ASM.len())
            .position(|window| window == crate::ax100::frame::ASM)
    }

    fn decode_helper(&mut self, buffer: &mut BytesMut) -> Result<Option<Vec<u8>>, Ax100Error> {
        if self.state == CodecState::Sync {
            if let Some(index) = self.find_sync(buffer) {
                buffer.advance(index);
                self.state = CodecState::Data;
            } else {
                // No ASM in the current buffer; keep ASM.len() - 1 bytes in
                // case the marker crosses a buffer boundary.
                let asm_len = crate::ax100::frame::ASM.len();
                let len = buffer.remaining();
                if len > asm_len - 1 {
                    buffer.advance(len - (asm_len - 1));
                }
                return Ok(None);
            }
        }

        let asm_len = crate::ax100::frame::ASM.len();
        if buffer.remaining() < asm_len + 3 {
            return Ok(None);
        }

        let codeword = ((buffer[asm_len] as u32) << 16)
            | ((buffer[asm_len + 1] as u32) << 8)
            | (buffer[asm_len + 2] as u32);
        let (_corrected, errcnt) = golay::decode(codeword);
        if errcnt == golay::UNCORRECTABLE {
            // The marker we matched was noise, not a real ASM; drop it and
            // resume searching for the next candidate.
            buffer.advance(asm_len);
            self.state = CodecState::Sync;
            return Err(Ax100Error::GolayUncorrectable);
        }
        let declared_len = (codeword & 0xFFF) as usize;
        let frame_len = asm_len + 3 + declared_len;

        if buffer.remaining() < frame_len {
            buffer.reserve(frame_len - buffer.remaining());
            return Ok(None);
        }

        let frame = buffer[..frame_len].to_vec();
        buffer.advance(frame_len);
        self.state = CodecState::Sync;

        self.ax100.decode(&frame)
    }
}

#[cfg(feature = "async-codec")]
mod non_tokio {
    use super::*;

    use asynchronous_codec::{Decoder, Encoder};

    impl Decoder for Ax100FrameCodec {
        type Item = Vec<u8>;

        type Error = Ax100Error;

        fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
            self.decode_helper(src)
        }
    }

    impl Encoder for Ax100FrameCodec {
        type Item = Vec<u8>;

        type Error = Ax100Error;

        fn encode(
            &mut self,
            item: Self::Item,
            dst: &mut asynchronous_codec::BytesMut,
        ) -> Result<(), Self::Error> {
            let bytes = self.ax100.encode(&item)?;
            dst.reserve(bytes.len());
            dst.extend(bytes);
            Ok(())
        }
    }
}

#[cfg(feature = "tokio-codec")]
mod tokio_codec {
    use tokio_util::codec::{Decoder, Encoder};

    use super::*;

    impl Decoder for Ax100FrameCodec {
        type Item = Vec<u8>;

        type Error = Ax100Error;

        fn decode(&mut self, src: &mut bytes::BytesMut) -> Result<Option<Self::Item>, Self::Error> {
            self.decode_helper(src)
        }
    }

    impl Encoder<Vec<u8>> for Ax100FrameCodec {
        type Error = Ax100Error;

        fn encode(&mut self, item: Vec<u8>, dst: &mut bytes::BytesMut) -> Result<(), Self::Error> {
            let bytes = self.ax100.encode(&item)?;
            dst.reserve(bytes.len());
            dst.extend(bytes);
            Ok(())
        }
    }
}

#[cfg(all(test, feature = "async-codec"))]
mod test {
    use super::*;

    use asynchronous_codec::Framed;
    use futures::{executor, io::Cursor, SinkExt, TryStreamExt};

    fn test_config() -> Ax100Config {
        Ax100Config {
            syncword: true,
            length_field: true,
            ..Ax100Config::default()
        }
    }

    #[test]
    fn codec_no_noise() {
        let expected = (0..77_u8).collect::<Vec<u8>>();

        let mut buf = vec![0_u8; 10];
        let buffer: Cursor<&mut Vec<u8>> = Cursor::new(&mut buf);

        let mut framed = Framed::new(buffer, Ax100FrameCodec::new(test_config()));

        executor::block_on(framed.send(expected.clone())).unwrap();

        let mut cursor = framed.into_inner();
        cursor.set_position(0);

        let mut framed = Framed::new(cursor, Ax100FrameCodec::new(test_config()));

        let recovered = executor::block_on(framed.try_next()).unwrap().unwrap();

        assert_eq!(expected, recovered)
    }

    #[test]
    fn codec_with_leading_noise() {
        let expected = (0..40_u8).collect::<Vec<u8>>();

        let mut buf = vec![0_u8; 10];
        let mut buffer: Cursor<&mut Vec<u8>> = Cursor::new(&mut buf);
        buffer.set_position(20);

        let mut framed = Framed::new(buffer, Ax100FrameCodec::new(test_config()));

        executor::block_on(framed.send(expected.clone())).unwrap();

        let mut cursor = framed.into_inner();
        cursor.set_position(0);
        cursor.get_mut()[..20].copy_from_slice((0_u8..20).collect::<Vec<u8>>().as_slice());
        cursor.set_position(0);

        let mut framed = Framed::new(cursor, Ax100FrameCodec::new(test_config()));

        let recovered = executor::block_on(framed.try_next()).unwrap().unwrap();

        assert_eq!(expected, recovered)
    }
}
