//! Village control declarations loader.

use std::path::Path;

use anyhow::Context;

use crate::VillageControlInfo;
use crate::loaders::{LoadResult, read_file};

/// Loader for village controls from RON files.
///
/// RON format: `Vec<VillageControlInfo>`
pub struct VillageLoader;

impl VillageLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<VillageControlInfo>> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<Vec<VillageControlInfo>> {
        let villages: Vec<VillageControlInfo> =
            ron::from_str(content).context("Failed to parse village RON")?;
        let mut seen = std::collections::BTreeSet::new();
        for village in &villages {
            anyhow::ensure!(seen.insert(village.id), "duplicate village id {}", village.id);
        }
        Ok(villages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttackActionInfo, TriggerInfo, VillageKindInfo};

    const VILLAGES: &str = r#"[
        (
            id: 1,
            kind: TopLevel(
                trigger: FirstContact(Power(killed_coeff: 1.0, power_coeff: 0.8)),
                action: Steal,
            ),
            faction: 2,
            villain: 1,
            location: 3,
        ),
        (
            id: 2,
            kind: TopLevel(trigger: Final(watched: [1])),
            faction: 3,
            villain: 1,
            location: 4,
        ),
        (id: 3, kind: Peaceful, faction: 4, villain: 1, location: 5),
    ]"#;

    #[test]
    fn parses_nested_triggers() {
        let villages = VillageLoader::parse(VILLAGES).expect("valid villages");
        assert_eq!(villages.len(), 3);
        assert_eq!(
            villages[0].kind,
            VillageKindInfo::TopLevel {
                trigger: TriggerInfo::FirstContact(Box::new(TriggerInfo::Power {
                    killed_coeff: 1.0,
                    power_coeff: 0.8,
                })),
                action: AttackActionInfo::Steal,
            }
        );
        assert!(matches!(
            &villages[1].kind,
            VillageKindInfo::TopLevel {
                trigger: TriggerInfo::Final { watched },
                action: AttackActionInfo::AttackLeader,
            } if watched == &[1]
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = VillageLoader::parse(
            "[(id: 1, kind: Dragon, faction: 2, villain: 1, location: 3),
              (id: 1, kind: Peaceful, faction: 4, villain: 1, location: 5)]",
        )
        .expect_err("duplicate");
        assert!(err.to_string().contains("duplicate village id 1"));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("villages.ron");
        std::fs::write(&path, VILLAGES).expect("write");
        assert_eq!(VillageLoader::load(&path).expect("load").len(), 3);
    }
}
