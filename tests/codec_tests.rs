use adaptive_lsb::{
    DecodeWarning, StegoError,
    bitstream::{from_bits, to_bits},
    capacity::{BitDepth, available_bits, check_fits, estimate_capacity_chars, select_depth},
    codec::{decode, decode_file, encode, encode_file, lossless_format, replace_file},
    header::{read_depth, write_depth},
    steganography::{embed, extract},
};
use image::{ImageBuffer, Rgb, RgbImage, Rgba};
use rand::RngCore;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的内存图像
fn random_image(width: u32, height: u32) -> RgbImage {
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);
    ImageBuffer::from_raw(width, height, raw_pixels).expect("buffer size matches dimensions")
}

/// 生成 `len` 个可打印 ASCII 字符，不含 '%'
fn ascii_message(len: usize) -> String {
    (0..len).map(|i| char::from(b'a' + (i % 26) as u8)).collect()
}

fn bits_for(chars: usize) -> u64 {
    ((chars + 3) * 8) as u64
}

#[test]
fn test_small_message_uses_depth_one() {
    let mut image = random_image(10, 10);

    let depth = encode(&mut image, "hi").expect("encode should succeed");
    assert_eq!(depth.get(), 1);

    let decoded = decode(&image).expect("decode should succeed");
    assert_eq!(decoded.message, "hi");
    assert_eq!(decoded.depth.get(), 1);
    assert!(decoded.is_clean());
}

/// 每个位深度都能正确往返
#[test]
fn test_round_trip_at_every_depth() {
    // 10x10 图像共 99 个可用像素，每级深度 297 bits
    for (chars, expected_depth) in [(30, 1u8), (40, 2), (90, 3), (140, 4)] {
        let mut image = random_image(10, 10);
        let message = ascii_message(chars);

        let depth = encode(&mut image, &message).expect("encode should succeed");
        assert_eq!(depth.get(), expected_depth, "message of {chars} chars");

        let header = read_depth(&image).expect("header pixel exists");
        assert_eq!(header.depth, depth);
        assert_eq!(header.corrupt, None);

        let decoded = decode(&image).expect("decode should succeed");
        assert_eq!(decoded.message, message);
        assert!(decoded.is_clean());
    }
}

/// 各种长度都能往返，覆盖结束标记跨越检查单元边界的情况
#[test]
fn test_round_trip_various_lengths() {
    for len in 0..60 {
        let mut image = random_image(17, 9);
        let message = ascii_message(len);
        encode(&mut image, &message).expect("encode should succeed");
        assert_eq!(decode(&image).expect("decode").message, message);
    }
}

#[test]
fn test_round_trip_latin1_characters() {
    let mut image = random_image(20, 20);
    let message = "café, naïve, ¿qué? \u{00ff}\u{0001}\n";

    encode(&mut image, message).expect("encode should succeed");
    assert_eq!(decode(&image).expect("decode").message, message);
}

/// 结束标记只落在图像最后几个像素、凑不满一个检查单元时也能找到
#[test]
fn test_terminator_in_final_partial_unit() {
    let mut image = random_image(3, 1);
    let depth = encode(&mut image, "").expect("empty message fits");
    assert_eq!(depth.get(), 4);

    let decoded = decode(&image).expect("decode");
    assert_eq!(decoded.message, "");
    assert!(decoded.is_clean());
}

#[test]
fn test_capacity_exceeded_on_tiny_image() {
    let original = random_image(2, 2);
    let mut image = original.clone();

    let result = encode(&mut image, "0123456789");
    match result {
        Err(StegoError::CapacityExceeded {
            required,
            available,
        }) => {
            assert_eq!(required, 104);
            assert_eq!(available, 36);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }
    assert_eq!(image, original, "no pixel may change when encoding fails");
}

#[test]
fn test_single_pixel_image_has_no_payload() {
    let mut image = random_image(1, 1);
    assert!(matches!(
        encode(&mut image, ""),
        Err(StegoError::CapacityExceeded { available: 0, .. })
    ));
    assert_eq!(estimate_capacity_chars(1, 1), 0);
}

#[test]
fn test_empty_image_is_rejected() {
    let image = RgbImage::new(0, 0);
    assert!(matches!(decode(&image), Err(StegoError::EmptyImage)));
}

/// 保守估算只按深度 1 计算，实际能写入的远多于此
#[test]
fn test_capacity_estimate_is_depth_one_only() {
    assert_eq!(estimate_capacity_chars(100, 100), 3746);

    let beyond_estimate = 5000;
    let required = bits_for(beyond_estimate);
    let depth = select_depth(100, 100, required);
    assert_eq!(depth.get(), 2);
    assert!(check_fits(100, 100, required, depth));
}

#[test]
fn test_check_fits_boundary() {
    let depth = BitDepth::MIN;
    assert_eq!(available_bits(10, 10, depth), 297);
    assert!(check_fits(10, 10, 297, depth));
    assert!(!check_fits(10, 10, 298, depth));

    for depth in BitDepth::all() {
        let available = 99 * 3 * u64::from(depth.get());
        assert!(check_fits(10, 10, available, depth));
        assert!(!check_fits(10, 10, available + 1, depth));
    }
}

#[test]
fn test_select_depth_is_monotonic() {
    let mut previous = BitDepth::MIN;
    for required in 0..2000 {
        let depth = select_depth(10, 10, required);
        assert!(depth >= previous, "depth dropped at {required} bits");
        previous = depth;
    }
    assert_eq!(previous, BitDepth::MAX);

    let mut previous = BitDepth::MAX;
    for side in 2..40 {
        let depth = select_depth(side, side, 1000);
        assert!(depth <= previous, "depth rose at {side}x{side}");
        previous = depth;
    }
    assert_eq!(previous, BitDepth::MIN);
}

#[test]
fn test_bit_depth_range() {
    assert!(BitDepth::new(0).is_none());
    assert!(BitDepth::new(5).is_none());
    assert_eq!(BitDepth::all().map(BitDepth::get).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(BitDepth::new(3).map(BitDepth::low_mask), Some(0b111));
}

/// 头部只改动 (0, 0) 红色通道的低 3 位
#[test]
fn test_header_write_read() {
    for depth in BitDepth::all() {
        let mut image = random_image(4, 4);
        let before = *image.get_pixel(0, 0);

        write_depth(&mut image, depth).expect("header pixel exists");
        let after = *image.get_pixel(0, 0);

        assert_eq!(after[0] & 0xF8, before[0] & 0xF8);
        assert_eq!(after[0] & 0x07, depth.get());
        assert_eq!((after[1], after[2]), (before[1], before[2]));
        assert_eq!(read_depth(&image).expect("header").depth, depth);
    }
}

#[test]
fn test_corrupt_header_falls_back_to_depth_one() {
    for raw in [0u8, 5, 6, 7] {
        let mut image = random_image(10, 10);
        encode(&mut image, "hello").expect("encode");
        let header = image.get_pixel_mut(0, 0);
        header[0] = (header[0] & 0xF8) | raw;

        let decoded = decode(&image).expect("decode never fails on a bad header");
        assert_eq!(decoded.depth, BitDepth::MIN);
        assert!(
            decoded
                .warnings
                .contains(&DecodeWarning::CorruptHeader { raw })
        );
        // 用深度 1 写入的消息仍可恢复
        assert_eq!(decoded.message, "hello");
    }
}

#[test]
fn test_missing_terminator_returns_best_effort_text() {
    let mut image = RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]));
    image.put_pixel(0, 0, Rgb([1, 0, 0]));

    let decoded = decode(&image).expect("decode");
    assert!(decoded.warnings.contains(&DecodeWarning::TerminatorNotFound));
    // 63 个像素 × 3 bits = 189 bits = 23 个完整字节
    assert_eq!(decoded.message, "\0".repeat(23));
}

#[test]
fn test_terminator_inside_message_truncates() {
    let mut image = random_image(20, 20);
    encode(&mut image, "abc%%%def").expect("encode");

    let decoded = decode(&image).expect("decode");
    assert_eq!(decoded.message, "abc");
    assert!(decoded.is_clean());
}

/// 结束标记不做转义：以 '%' 结尾的消息会与标记重叠，解码时被提前截断
#[test]
fn test_trailing_percent_overlaps_terminator() {
    for (message, expected) in [("a%", "a"), ("a%%", "a"), ("%", "")] {
        let mut image = random_image(20, 20);
        encode(&mut image, message).expect("encode");

        let decoded = decode(&image).expect("decode");
        assert_eq!(decoded.message, expected, "message {message:?}");
        assert!(decoded.is_clean());
    }
}

#[test]
fn test_unsupported_character_is_rejected() {
    let original = random_image(20, 20);
    let mut image = original.clone();

    match encode(&mut image, "ok 日本") {
        Err(StegoError::UnsupportedCharacter { character, index }) => {
            assert_eq!(character, '日');
            assert_eq!(index, 3);
        }
        other => panic!("expected UnsupportedCharacter, got {other:?}"),
    }
    assert_eq!(image, original);
}

/// 只有承载消息所需的前缀像素的低位被改动
#[test]
fn test_encoding_disturbs_only_needed_low_bits() {
    for chars in [30usize, 40, 90, 140] {
        let original = random_image(10, 10);
        let mut image = original.clone();
        let depth = encode(&mut image, &ascii_message(chars)).expect("encode");

        let per_pixel = 3 * u64::from(depth.get());
        let used_pixels = bits_for(chars).div_ceil(per_pixel);
        let high_mask = !depth.low_mask();

        for (index, ((x, y, before), after)) in original
            .enumerate_pixels()
            .zip(image.pixels())
            .enumerate()
        {
            if (x, y) == (0, 0) {
                assert_eq!(before[0] & 0xF8, after[0] & 0xF8);
                assert_eq!((before[1], before[2]), (after[1], after[2]));
                continue;
            }
            // index 0 是头部像素，payload 下标从 1 开始
            if index as u64 > used_pixels {
                assert_eq!(before, after, "pixel ({x},{y}) beyond the message changed");
            } else {
                for channel in 0..3 {
                    assert_eq!(before[channel] & high_mask, after[channel] & high_mask);
                }
            }
        }
    }
}

/// 位流在通道中途结束时，该通道未使用的低位保持原值
#[test]
fn test_partial_last_channel_keeps_unused_bits() {
    let mut image = RgbImage::from_pixel(10, 1, Rgb([0xFF; 3]));
    let bits = to_bits("a").expect("ASCII is supported");
    let depth = BitDepth::new(3).expect("3 is a valid depth");

    // 32 bits 在深度 3 下占满 10 个通道，第 11 个通道 (第 4 个 payload 像素的 G) 只写 2 位
    embed(&mut image, &bits, depth);

    let last = image.get_pixel(4, 0);
    // '%' = 0b0010_0101，最后两位依次写入第 0、1 位
    assert_eq!(last[1], 0b1111_1110);
    assert_eq!(last[2], 0xFF);
    assert_eq!(*image.get_pixel(5, 0), Rgb([0xFF; 3]));
}

/// 找到结束标记后立即停止，返回的位数恰好到标记末尾
#[test]
fn test_extract_stops_at_terminator() {
    let mut image = random_image(200, 200);
    let depth = encode(&mut image, "early exit").expect("encode");

    let extraction = extract(&image, depth);
    assert!(extraction.terminator_found);
    assert_eq!(extraction.bits.len() as u64, bits_for("early exit".len()));
    assert_eq!(from_bits(extraction.bits.as_slice()), "early exit%%%");
}

#[test]
fn test_bitstream_layout() {
    let bits = to_bits("A").expect("ASCII is supported");
    assert_eq!(bits.len(), 32);

    let first: Vec<u8> = bits.as_slice()[..8].iter().map(|&b| u8::from(b)).collect();
    assert_eq!(first, vec![0, 1, 0, 0, 0, 0, 0, 1]);

    // 不足 8 位的尾部被丢弃
    let mut partial = bits.as_slice()[..8].to_vec();
    partial.extend([true, false, true]);
    assert_eq!(from_bits(&partial), "A");
}

#[test]
fn test_lossless_format_selection() {
    assert!(lossless_format(Path::new("out.png")).is_ok());
    assert!(lossless_format(Path::new("out.bmp")).is_ok());
    assert!(matches!(
        lossless_format(Path::new("out.jpg")),
        Err(StegoError::LossyOutputFormat(_))
    ));
    assert!(matches!(
        lossless_format(Path::new("out.unknown")),
        Err(StegoError::LossyOutputFormat(_))
    ));
}

#[test]
fn test_file_round_trip_drops_alpha() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("rgba.png");
    let output = dir.path().join("nested").join("encoded.png");

    let rgb = random_image(30, 30);
    let rgba = ImageBuffer::from_fn(30, 30, |x, y| {
        let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
        Rgba([r, g, b, 128])
    });
    rgba.save(&input)?;

    let depth = encode_file(&input, "file round trip", &output)?;
    assert_eq!(depth.get(), 1);
    assert!(output.exists());

    let decoded = decode_file(&output)?;
    assert_eq!(decoded.message, "file round trip");
    Ok(())
}

#[test]
fn test_lossy_output_leaves_no_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("cover.png");
    let output = dir.path().join("encoded.jpg");
    random_image(30, 30).save(&input)?;

    let result = encode_file(&input, "lost", &output);
    assert!(matches!(result, Err(StegoError::LossyOutputFormat(_))));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_missing_input_is_wrapped() {
    let result = decode_file(Path::new("does/not/exist.png"));
    assert!(matches!(result, Err(StegoError::Image { .. })));
}

/// 写入中途失败时，目标路径上原有的文件保持不变，也不残留临时文件
#[test]
fn test_failed_write_keeps_previous_output() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let output = dir.path().join("encoded.png");
    fs::write(&output, b"previous image")?;

    let result = replace_file(&output, |file| {
        file.write_all(b"partial")?;
        Err(io::Error::other("disk full"))
    });

    assert!(matches!(result, Err(StegoError::Io { .. })));
    assert_eq!(fs::read(&output)?, b"previous image");
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn test_failed_write_creates_no_output() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let output = dir.path().join("encoded.png");

    let result = replace_file(&output, |file| {
        file.write_all(b"partial")?;
        Err(io::Error::other("disk full"))
    });

    assert!(result.is_err());
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

/// 保存成功时会替换掉已有的文件
#[test]
fn test_encode_file_replaces_existing_output() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("cover.png");
    let output = dir.path().join("encoded.png");
    random_image(30, 30).save(&input)?;
    fs::write(&output, b"stale")?;

    encode_file(&input, "fresh", &output)?;

    assert_eq!(decode_file(&output)?.message, "fresh");
    assert_eq!(fs::read_dir(dir.path())?.count(), 2);
    Ok(())
}
