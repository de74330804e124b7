/// 消息结束标记。解码时遇到第一个 `%%%` 即视为消息结束。
pub const TERMINATOR: &str = "%%%";

/// 每个字符按 8 bits 编码 (高位在前)。
pub const BITS_PER_CHAR: usize = 8;

/// 每个像素参与隐写的颜色通道数 (R, G, B)。
pub const CHANNELS_PER_PIXEL: u64 = 3;

/// 每个通道可使用的最低位数下限。
pub const MIN_BIT_DEPTH: u8 = 1;

/// 每个通道可使用的最低位数上限。
pub const MAX_BIT_DEPTH: u8 = 4;

/// 头部像素的坐标 (x, y)。该像素不承载消息数据。
pub const HEADER_PIXEL: (u32, u32) = (0, 0);

/// 头部像素红色通道中存放位深度的低 3 位掩码。
pub const HEADER_DEPTH_MASK: u8 = 0x07;

/// 写入位深度时保留的红色通道高 5 位掩码。
pub const HEADER_KEEP_MASK: u8 = 0xF8;

/// 提取时每处理多少行输出一次进度。
pub const PROGRESS_ROW_INTERVAL: u32 = 50;

/// 默认的输入目录。
pub const DEFAULT_INPUT_DIR: &str = "data/input";

/// 未指定输出路径时，编码结果的默认保存目录。
pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// 默认输出文件名中随机后缀的取值范围。
pub const SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 10000..=20000;
