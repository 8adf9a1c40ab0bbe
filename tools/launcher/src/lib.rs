//! # Launcher
//!
//! Runs on the Espresso as an ordinary application. It reads the Starbuck
//! payload and the ancast boot image from storage, copies both into MEM2
//! through `/dev/iosuhax`, leaves a [`BootHandoff`] describing them, and
//! finally has the IOSU kernel branch into the payload. From then on
//! Starbuck is in charge and this processor is about to be reset.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

use core::fmt;
use iosuhax::{ChannelError, Ios, IosuhaxChannel};
use latte_info::memory::{
    ANCAST_MAX_SIZE, ARM_PAYLOAD_ADDR, ARM_PAYLOAD_MAX_SIZE, HANDOFF_ADDR, IMAGE_STAGING_ADDR,
    PPC_REDIRECT_DEFAULT, WIIU_SLOT_BASE,
};
use latte_info::{BootHandoff, PatchPolicy};
use latte_mmio::PhysAddr;

pub const DEFAULT_ARM_PAYLOAD_PATH: &str = "/vol/external01/wiiu/linux/starbuck.bin";
pub const DEFAULT_IMAGE_PATH: &str = "/vol/external01/wiiu/linux/fw.img";

/// Storage the launcher reads its inputs from.
pub trait FileSource {
    /// Size of `path` in bytes.
    ///
    /// # Errors
    /// A negative filesystem error code.
    fn file_size(&mut self, path: &str) -> Result<usize, i32>;

    /// Read up to `buf.len()` bytes from the start of `path` into `buf`,
    /// returning the number of bytes read.
    ///
    /// # Errors
    /// A negative filesystem error code.
    fn read_file(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, i32>;
}

/// The two files the launcher delivers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FileKind {
    ArmPayload,
    Image,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArmPayload => f.write_str("Starbuck payload"),
            Self::Image => f.write_str("boot image"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LaunchError {
    #[error("cannot read {file}: error {code}")]
    Read { file: FileKind, code: i32 },
    #[error("{file} is empty")]
    Empty { file: FileKind },
    #[error("{file} does not fit in {limit:#x} bytes")]
    TooLarge { file: FileKind, limit: usize },
    #[error("{file} needs a {needed:#x} byte buffer")]
    BufferTooSmall { file: FileKind, needed: usize },
    #[error("{file}: read {read:#x} of {expected:#x} bytes")]
    Truncated {
        file: FileKind,
        expected: usize,
        read: usize,
    },
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LaunchConfig<'p> {
    pub arm_payload_path: &'p str,
    pub image_path: &'p str,
    /// Slot the payload relocates the image into.
    pub slot_base: PhysAddr,
    /// Where the Espresso continues once the race is won.
    pub redirect: PhysAddr,
    pub patch_policy: PatchPolicy,
}

impl Default for LaunchConfig<'_> {
    fn default() -> Self {
        Self {
            arm_payload_path: DEFAULT_ARM_PAYLOAD_PATH,
            image_path: DEFAULT_IMAGE_PATH,
            slot_base: WIIU_SLOT_BASE,
            redirect: PPC_REDIRECT_DEFAULT,
            patch_policy: PatchPolicy::default(),
        }
    }
}

pub struct Launcher<'p> {
    config: LaunchConfig<'p>,
}

impl<'p> Launcher<'p> {
    #[must_use]
    pub const fn new(config: LaunchConfig<'p>) -> Self {
        Self { config }
    }

    /// Stage both files and the hand-off record, then start the payload.
    ///
    /// `buffer` is scratch space for one file at a time and must hold the
    /// larger of the two files.
    ///
    /// # Errors
    /// A file could not be read or is unusable, or the channel failed. If
    /// this returns, the payload was not started.
    pub fn deliver<I: Ios, F: FileSource>(
        &self,
        channel: &mut IosuhaxChannel<I>,
        files: &mut F,
        buffer: &mut [u8],
    ) -> Result<BootHandoff, LaunchError> {
        let cfg = &self.config;

        let image = read(files, FileKind::Image, cfg.image_path, buffer, ANCAST_MAX_SIZE)?;
        // Bounded by ANCAST_MAX_SIZE.
        let image_len = u32::try_from(image.len()).unwrap_or(u32::MAX);
        log::info!("staging {image_len:#x} byte image at {IMAGE_STAGING_ADDR}");
        channel.write_block(IMAGE_STAGING_ADDR, image)?;

        let payload = read(
            files,
            FileKind::ArmPayload,
            cfg.arm_payload_path,
            buffer,
            ARM_PAYLOAD_MAX_SIZE,
        )?;
        log::info!("staging {:#x} byte payload at {ARM_PAYLOAD_ADDR}", payload.len());
        channel.write_block(ARM_PAYLOAD_ADDR, payload)?;

        let mut handoff = BootHandoff::new(
            IMAGE_STAGING_ADDR.as_u32(),
            image_len,
            cfg.slot_base.as_u32(),
            cfg.redirect.as_u32(),
        );
        handoff.detect_only = u32::from(cfg.patch_policy == PatchPolicy::DetectOnly);

        let mut record = [0; 4 * latte_info::boot::HANDOFF_WORDS];
        for (bytes, word) in record.chunks_exact_mut(4).zip(handoff.to_words()) {
            bytes.copy_from_slice(&word.to_ne_bytes());
        }
        channel.write_block(HANDOFF_ADDR, &record)?;

        channel.trigger_privileged_call(ARM_PAYLOAD_ADDR)?;
        Ok(handoff)
    }
}

/// Read all of `path` into the front of `buffer`.
///
/// The file is sized first, so a file that exactly fills `buffer` or
/// exactly reaches `limit` is accepted.
fn read<'b, F: FileSource>(
    files: &mut F,
    file: FileKind,
    path: &str,
    buffer: &'b mut [u8],
    limit: u32,
) -> Result<&'b [u8], LaunchError> {
    let size = files
        .file_size(path)
        .map_err(|code| LaunchError::Read { file, code })?;
    if size == 0 {
        return Err(LaunchError::Empty { file });
    }
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    if size > limit {
        return Err(LaunchError::TooLarge { file, limit });
    }
    if size > buffer.len() {
        return Err(LaunchError::BufferTooSmall { file, needed: size });
    }

    let data = &mut buffer[..size];
    let read = files
        .read_file(path, data)
        .map_err(|code| LaunchError::Read { file, code })?;
    if read != size {
        return Err(LaunchError::Truncated {
            file,
            expected: size,
            read,
        });
    }
    Ok(data)
}
