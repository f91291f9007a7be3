//! Timed status effects.
//!
//! An [`EffectSet`] holds at most one instance per [`EffectKind`].
//! Reapplying a kind refreshes its remaining time and keeps the larger
//! magnitude; counts never stack. The set itself is agnostic to what an
//! effect means. The helpers at the bottom of this module are the shared
//! interpretation used by movement, casting and damage code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::Fixed;

/// Kind of status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Move speed × (1 − magnitude).
    Slow,
    /// No movement, no attacks, no casting.
    Stun,
    /// No movement, no attacks.
    Freeze,
    /// No casting.
    Silence,
    /// Periodic fire damage.
    Burn,
    /// Periodic poison damage.
    Poison,
    /// Incoming damage × (1 − magnitude).
    DamageReduction,
    /// Move speed × (1 − magnitude).
    MoveSpeedReduction,
    /// Heal for damage × magnitude on skill hits.
    Lifesteal,
    /// Skill damage × (1 + magnitude).
    DamageBoost,
    /// Move speed × (1 + magnitude).
    MoveSpeedBoost,
}

/// Effect as carried by a skill before it lands on anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Effect {
    /// What the effect does.
    pub kind: EffectKind,
    /// Lifetime in seconds.
    #[serde(with = "crate::math::fixed_serde")]
    pub duration: Fixed,
    /// Strength; meaning depends on `kind`.
    #[serde(with = "crate::math::fixed_serde")]
    pub magnitude: Fixed,
    /// Seconds between periodic ticks; zero for non-periodic effects.
    #[serde(with = "crate::math::fixed_serde")]
    pub tick_rate: Fixed,
}

impl Effect {
    /// A non-periodic effect.
    #[must_use]
    pub const fn timed(kind: EffectKind, duration: Fixed, magnitude: Fixed) -> Self {
        Self {
            kind,
            duration,
            magnitude,
            tick_rate: Fixed::ZERO,
        }
    }

    /// A periodic effect dealing `floor(magnitude)` every `tick_rate` seconds.
    #[must_use]
    pub const fn periodic(kind: EffectKind, duration: Fixed, magnitude: Fixed, tick_rate: Fixed) -> Self {
        Self {
            kind,
            duration,
            magnitude,
            tick_rate,
        }
    }
}

/// An effect active on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectInstance {
    /// Definition as applied (magnitude may have been raised by reapplication).
    pub effect: Effect,
    /// Seconds until expiry.
    #[serde(with = "crate::math::fixed_serde")]
    pub remaining: Fixed,
    /// Seconds since the last periodic tick.
    #[serde(with = "crate::math::fixed_serde")]
    pub tick_timer: Fixed,
}

/// Active effects on one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectSet {
    active: BTreeMap<EffectKind, EffectInstance>,
}

impl EffectSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect.
    ///
    /// An existing instance of the same kind has its remaining time reset
    /// to the new duration and its magnitude raised to the larger of the
    /// two. Its tick rate and tick progress are kept.
    ///
    /// # Example
    ///
    /// ```
    /// use crawl_core::effects::{Effect, EffectKind, EffectSet};
    /// use crawl_core::math::Fixed;
    ///
    /// let mut effects = EffectSet::new();
    /// effects.apply(Effect::timed(EffectKind::Slow, Fixed::from_num(3), Fixed::from_num(0.5)));
    /// effects.apply(Effect::timed(EffectKind::Slow, Fixed::from_num(1), Fixed::from_num(0.25)));
    /// assert_eq!(effects.len(), 1);
    /// assert_eq!(effects.magnitude(EffectKind::Slow), Fixed::from_num(0.5));
    /// ```
    pub fn apply(&mut self, effect: Effect) {
        self.active
            .entry(effect.kind)
            .and_modify(|existing| {
                existing.remaining = effect.duration;
                existing.effect.magnitude = existing.effect.magnitude.max(effect.magnitude);
            })
            .or_insert(EffectInstance {
                effect,
                remaining: effect.duration,
                tick_timer: Fixed::ZERO,
            });
    }

    /// Advance every effect by `dt`.
    ///
    /// Periodic effects whose accumulator reaches the tick rate call
    /// `on_periodic` with the floored magnitude and restart the
    /// accumulator. Effects with no time left are removed afterwards.
    pub fn tick(&mut self, dt: Fixed, mut on_periodic: impl FnMut(EffectKind, u32)) {
        for (&kind, instance) in &mut self.active {
            instance.remaining -= dt;

            let rate = instance.effect.tick_rate;
            if rate > Fixed::ZERO {
                instance.tick_timer += dt;
                if instance.tick_timer >= rate {
                    on_periodic(kind, crate::math::floor_u32(instance.effect.magnitude));
                    instance.tick_timer = Fixed::ZERO;
                }
            }
        }

        self.active
            .retain(|_, instance| instance.remaining > Fixed::ZERO);
    }

    /// Whether an effect of `kind` is active.
    #[must_use]
    pub fn has(&self, kind: EffectKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Magnitude of `kind`, zero when absent.
    #[must_use]
    pub fn magnitude(&self, kind: EffectKind) -> Fixed {
        self.active
            .get(&kind)
            .map_or(Fixed::ZERO, |instance| instance.effect.magnitude)
    }

    /// Active instance of `kind`.
    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<&EffectInstance> {
        self.active.get(&kind)
    }

    /// Remove `kind`, returning the instance if it was active.
    pub fn remove(&mut self, kind: EffectKind) -> Option<EffectInstance> {
        self.active.remove(&kind)
    }

    /// Drop every effect.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Number of active effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no effect is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active effects in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &EffectInstance> {
        self.active.values()
    }

    /// Stunned or frozen entities cannot move or attack.
    #[must_use]
    pub fn is_immobilized(&self) -> bool {
        self.has(EffectKind::Stun) || self.has(EffectKind::Freeze)
    }

    /// Silenced or stunned entities cannot cast.
    #[must_use]
    pub fn blocks_casting(&self) -> bool {
        self.has(EffectKind::Silence) || self.has(EffectKind::Stun)
    }

    /// Factor applied to base move speed. Zero while immobilized.
    #[must_use]
    pub fn speed_multiplier(&self) -> Fixed {
        if self.is_immobilized() {
            return Fixed::ZERO;
        }
        let slow = Fixed::ONE - self.magnitude(EffectKind::Slow);
        let reduction = Fixed::ONE - self.magnitude(EffectKind::MoveSpeedReduction);
        let boost = Fixed::ONE + self.magnitude(EffectKind::MoveSpeedBoost);
        (slow * reduction * boost).max(Fixed::ZERO)
    }

    /// Incoming damage after damage reduction, floored.
    #[must_use]
    pub fn reduce_incoming(&self, amount: u32) -> u32 {
        let reduction = self.magnitude(EffectKind::DamageReduction);
        if reduction <= Fixed::ZERO {
            return amount;
        }
        let factor = (Fixed::ONE - reduction).max(Fixed::ZERO);
        crate::math::floor_u32(Fixed::from_num(amount) * factor)
    }
}
