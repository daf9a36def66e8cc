/*++

Licensed under the Apache-2.0 license.

File Name:

    random.rs

Abstract:

    File contains the random number command.

--*/

use super::Context;
use crate::CommandError;
use se_emu_bus::Bus;

pub(super) fn get_random<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [len] = ctx.command.params::<1>()?;
    ctx.put_random(len as usize)
}
