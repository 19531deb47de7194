use crate::detection::geometry::Point2D;

/// 一帧 BGR 图像（每像素 3 字节）
///
/// 仅回放关键点时 `data` 可以为空（宽高为 0）。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub index: u64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// 灰度图，携带来源帧序号，供关键点检测使用
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GrayImage {
    pub frame_index: u64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// 附带眼部轮廓叠加层的帧，仅用于显示
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotatedFrame {
    pub frame: Frame,
    pub contours: Vec<Vec<Point2D>>,
}

impl Frame {
    /// 仅有序号、不含像素数据的帧
    pub fn empty(index: u64) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn has_pixels(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == self.width as usize * self.height as usize * 3
    }

    /// Nearest-neighbour resize. Frames without pixel data are returned unchanged.
    pub fn resized(self, width: u32, height: u32) -> Frame {
        if !self.has_pixels() || width == 0 || height == 0 {
            return self;
        }
        if self.width == width && self.height == height {
            return self;
        }

        let (src_w, src_h) = (self.width as usize, self.height as usize);
        let (dst_w, dst_h) = (width as usize, height as usize);
        let mut data = Vec::with_capacity(dst_w * dst_h * 3);
        for y in 0..dst_h {
            let sy = y * src_h / dst_h;
            for x in 0..dst_w {
                let sx = x * src_w / dst_w;
                let offset = (sy * src_w + sx) * 3;
                data.extend_from_slice(&self.data[offset..offset + 3]);
            }
        }

        Frame {
            index: self.index,
            width,
            height,
            data,
        }
    }

    /// BT.601 luma: 0.299 R + 0.587 G + 0.114 B
    pub fn to_gray(&self) -> GrayImage {
        if !self.has_pixels() {
            return GrayImage {
                frame_index: self.index,
                ..GrayImage::default()
            };
        }

        let data = self
            .data
            .chunks_exact(3)
            .map(|bgr| {
                let (b, g, r) = (bgr[0] as u32, bgr[1] as u32, bgr[2] as u32);
                ((299 * r + 587 * g + 114 * b + 500) / 1000) as u8
            })
            .collect();

        GrayImage {
            frame_index: self.index,
            width: self.width,
            height: self.height,
            data,
        }
    }
}
