/*++

Licensed under the Apache-2.0 license.

File Name:

    device.rs

Abstract:

    File contains the flash and device information commands.

--*/

use super::Context;
use crate::{CommandError, MailboxProtocol, ResponseCode};
use se_emu_bus::{Bus, MemoryAccessor};
use tock_registers::register_bitfields;

/// Page size assumed by Series 2 devices without a configured one
const DEFAULT_FLASH_PAGE_SIZE: u32 = 8 * 1024;

/// Value of an erased flash word
const ERASED_WORD: u32 = 0xFFFF_FFFF;

register_bitfields! [
    u32,

    /// GetStatus response word
    Status [
        HASH_STREAM_ACTIVE OFFSET(0) NUMBITS(1) [],
        VOLATILE_KEYS OFFSET(8) NUMBITS(8) [],
        SERIES3 OFFSET(16) NUMBITS(1) [],
    ],
];

/// Effective flash page size.
fn page_size<B: Bus>(ctx: &Context<'_, B>) -> Result<u32, CommandError> {
    let config = ctx.config;
    match config.protocol {
        MailboxProtocol::Series3 if config.flash_size == 0 || config.flash_page_size == 0 => {
            log::warn!("Flash geometry not configured");
            Err(ResponseCode::Abort.into())
        }
        MailboxProtocol::Series2 if config.flash_page_size == 0 => Ok(DEFAULT_FLASH_PAGE_SIZE),
        _ => Ok(config.flash_page_size),
    }
}

/// Reject `[start, end)` unless it lies within the configured flash.
fn check_range<B: Bus>(ctx: &Context<'_, B>, start: u64, end: u64) -> Result<(), CommandError> {
    let config = ctx.config;
    if config.flash_size == 0 {
        return Ok(());
    }
    let base = u64::from(config.flash_base);
    if start < base || end > base + u64::from(config.flash_size) {
        log::warn!("Flash range {:#x}..{:#x} out of bounds", start, end);
        return Err(ResponseCode::InvalidParameter.into());
    }
    Ok(())
}

pub(super) fn flash_erase_page<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [address, page_count] = ctx.command.params::<2>()?;
    let page = page_size(ctx)?;
    let start = address - address % page;
    let end = u64::from(start) + u64::from(page_count) * u64::from(page);
    check_range(ctx, u64::from(start), end)?;
    if end > u64::from(u32::MAX) + 1 {
        return Err(ResponseCode::InvalidParameter.into());
    }
    log::debug!("Erasing {} flash pages from {:#010x}", page_count, start);
    for addr in (u64::from(start)..end).step_by(4) {
        ctx.bus.write_word(addr as u32, ERASED_WORD)?;
    }
    Ok(())
}

pub(super) fn flash_write<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [address, data_len] = ctx.command.params::<2>()?;
    page_size(ctx)?;
    let end = u64::from(address) + u64::from(data_len);
    check_range(ctx, u64::from(address), end)?;
    let data = ctx.take(data_len as usize)?;
    ctx.bus.write_bytes(address, &data)?;
    Ok(())
}

pub(super) fn flash_get_info<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [] = ctx.command.params::<0>()?;
    let mut info = ctx.config.flash_size.to_le_bytes().to_vec();
    info.extend_from_slice(&ctx.config.flash_page_size.to_le_bytes());
    ctx.put(&info)
}

pub(super) fn get_status<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [] = ctx.command.params::<0>()?;
    let volatile_keys = ctx.state.volatile_key_count().min(0xFF) as u32;
    let mut status = Status::VOLATILE_KEYS.val(volatile_keys);
    if ctx.state.hash_stream().is_some() {
        status += Status::HASH_STREAM_ACTIVE::SET;
    }
    if ctx.config.protocol == MailboxProtocol::Series3 {
        status += Status::SERIES3::SET;
    }
    let mut out = status.value.to_le_bytes().to_vec();
    out.extend_from_slice(&ctx.config.firmware_version.to_le_bytes());
    ctx.put(&out)
}

pub(super) fn read_serial<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [] = ctx.command.params::<0>()?;
    let serial = ctx.config.serial_number;
    ctx.put(&serial)
}
