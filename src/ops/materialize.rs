//! Copying closure members into the staging directory.

use glob::Pattern;
use rayon::prelude::*;

use crate::core::closure::{ClosureMember, DependencyClosure};
use crate::core::error::StageResult;
use crate::core::staging::StagingDirectory;
use crate::util::fs;

/// Ensure `staging` exists and copy every closure member into it.
///
/// Copies run in parallel and the call succeeds only if all of them do.
/// Copies already finished when another fails are left in place.
/// `on_copied` is called once per member after its copy completes.
pub fn materialize<F>(
    staging: &StagingDirectory,
    closure: &DependencyClosure,
    exclude: &[Pattern],
    on_copied: F,
) -> StageResult<()>
where
    F: Fn(&ClosureMember) + Sync,
{
    staging.ensure()?;

    let members: Vec<&ClosureMember> = closure.iter().collect();
    members.par_iter().try_for_each(|member| -> StageResult<()> {
        let dest = staging.member_path(&member.name);
        tracing::debug!(
            "copying `{}` from {} to {}",
            member.name,
            member.source.display(),
            dest.display()
        );
        fs::copy_dir_all(&member.source, &dest, Some(staging.path()), exclude)?;
        on_copied(*member);
        Ok(())
    })
}
