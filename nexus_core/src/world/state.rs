//! GameState - The complete simulation of one run

use super::object::{FieldObject, Loot, NexusObject, Structure, StructureKind};
use super::spawner::Spawner;
use super::zone::{ZoneInstance, ZoneObjectSpec};
use crate::config::{Content, SimConstants};
use crate::job::Economy;
use crate::types::{AllyTypeId, Circle, EnemyTypeId, HeroClassId, ObjectId, ObjectIdAllocator, ZoneId};
use crate::unit::{Ally, Enemy, Hero};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use tracing::{debug, error, info};

/// The city wall shielding the nexus
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WallState {
    pub level: u32,
    pub health: f64,
    pub max_health: f64,
    /// Fixed damage reflected at whoever hits the wall
    pub return_damage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NexusState {
    /// The nexus body in the overworld
    pub object: ObjectId,
    pub essence: f64,
    /// Hero deaths this run; every death lengthens later revives
    pub death_count: u32,
    pub wall: WallState,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Level of the next spawner the overworld creates
    pub next_spawner_level: u32,
}

/// Tallies of a run, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunCounters {
    pub frames: u64,
    pub enemies_killed: u64,
    pub spawners_destroyed: u64,
    pub hero_deaths: u64,
    pub jobs_completed: u64,
    pub damage_dealt: f64,
    pub damage_taken: f64,
    pub essence_collected: f64,
}

pub struct GameState {
    pub content: Content,
    pub constants: SimConstants,
    pub zones: BTreeMap<ZoneId, ZoneInstance>,
    pub world: WorldState,
    pub nexus: NexusState,
    pub economy: Economy,
    pub counters: RunCounters,
    /// Last hero healed by the round-robin healing job
    pub healer_last_target: Option<ObjectId>,
    pub rng: StdRng,
    ids: ObjectIdAllocator,
}

impl GameState {
    /// New run with the configured starting heroes
    pub fn new(content: Content, constants: SimConstants, seed: u64) -> Self {
        let heroes = constants.heroes.starting_heroes.clone();
        Self::with_heroes(content, constants, seed, &heroes)
    }

    /// New run with the given hero classes
    pub fn with_heroes(content: Content, constants: SimConstants, seed: u64, heroes: &[HeroClassId]) -> Self {
        let mut ids = ObjectIdAllocator::new();
        let nexus_id = ids.allocate();
        let economy = Economy::new(&constants);

        let mut state = GameState {
            nexus: NexusState {
                object: nexus_id,
                essence: constants.nexus.starting_essence,
                death_count: 0,
                wall: WallState::default(),
            },
            world: WorldState { next_spawner_level: 1 },
            zones: BTreeMap::new(),
            economy,
            counters: RunCounters::default(),
            healer_last_target: None,
            rng: StdRng::seed_from_u64(seed),
            ids,
            content,
            constants,
        };

        let world = ZoneId::world();
        if !state.ensure_zone(&world) {
            error!("content has no overworld zone; creating an empty one");
            state.zones.insert(world.clone(), ZoneInstance::new(world.clone(), (0.0, 0.0)));
        }
        let nexus = NexusObject {
            id: nexus_id,
            circle: Circle::new(state.constants.nexus.x, state.constants.nexus.y, state.constants.nexus.radius),
        };
        if let Some(zone) = state.zones.get_mut(&world) {
            zone.objects.push(FieldObject::Nexus(nexus));
        }

        for _ in 0..state.constants.spawners.count {
            state.spawn_world_spawner();
        }
        for (index, class) in heroes.iter().enumerate() {
            let name = format!("Hero {}", index + 1);
            if state.spawn_hero(class, &name).is_none() {
                error!(%class, "unknown starting hero class");
            }
        }
        state
    }

    pub fn allocate_id(&mut self) -> ObjectId {
        self.ids.allocate()
    }

    /// Spend essence if there is enough; false (and nothing spent) otherwise
    pub fn spend_essence(&mut self, amount: f64) -> bool {
        if amount < 0.0 || self.nexus.essence < amount {
            return false;
        }
        self.nexus.essence -= amount;
        true
    }

    pub fn gain_essence(&mut self, amount: f64) {
        if amount > 0.0 {
            self.nexus.essence += amount;
        }
    }

    /// Raise the wall one level; the added capacity arrives as health
    pub fn gain_wall_level(&mut self) {
        let wall = &mut self.nexus.wall;
        wall.level += 1;
        let max_health = self.constants.wall_max_health(wall.level);
        wall.health = (wall.health + (max_health - wall.max_health)).clamp(0.0, max_health);
        wall.max_health = max_health;
        wall.return_damage = self.constants.wall_return_damage(wall.level);
        info!(level = wall.level, "wall upgraded");
    }

    pub fn gain_population_level(&mut self) {
        self.economy.population_level += 1;
        self.economy.population = self.constants.population(self.economy.population_level);
        debug!(population = self.economy.population, "population grew");
    }

    /// Create a zone from its definition the first time it is needed;
    /// false if no definition exists
    pub fn ensure_zone(&mut self, id: &ZoneId) -> bool {
        if self.zones.contains_key(id) {
            return true;
        }
        let Some(definition) = self.content.zones.get(id).cloned() else {
            return false;
        };

        self.zones.insert(id.clone(), ZoneInstance::new(id.clone(), definition.entry));
        for spec in &definition.layout {
            match spec {
                ZoneObjectSpec::Enemy { enemy, level, x, y } => {
                    self.spawn_enemy(id, enemy, *level, *x, *y, None);
                }
                ZoneObjectSpec::Spawner { enemy, level, x, y } => {
                    let spawner = Spawner::new(self.allocate_id(), enemy.clone(), *level, *x, *y, &self.constants);
                    self.push_object(id, FieldObject::Spawner(spawner));
                }
                ZoneObjectSpec::ResourceNode { resource, amount, x, y, r } => {
                    let structure = Structure {
                        id: self.allocate_id(),
                        circle: Circle::new(*x, *y, *r),
                        kind: StructureKind::ResourceNode {
                            resource: *resource,
                            remaining: *amount,
                        },
                    };
                    self.push_object(id, FieldObject::Structure(structure));
                }
                ZoneObjectSpec::Portal { zone, x, y, r } => {
                    let structure = Structure {
                        id: self.allocate_id(),
                        circle: Circle::new(*x, *y, *r),
                        kind: StructureKind::Portal { zone: zone.clone() },
                    };
                    self.push_object(id, FieldObject::Structure(structure));
                }
            }
        }
        info!(zone = %id, name = %definition.name, "zone created");
        true
    }

    fn push_object(&mut self, zone: &ZoneId, object: FieldObject) {
        match self.zones.get_mut(zone) {
            Some(instance) => instance.objects.push(object),
            None => error!(%zone, object = %object.id(), "object placed in a missing zone"),
        }
    }

    /// Place a new hero of `class` at the overworld entry
    pub fn spawn_hero(&mut self, class: &HeroClassId, name: &str) -> Option<ObjectId> {
        let definition = self.content.hero_classes.get(class)?;
        let id = self.ids.allocate();
        let world = ZoneId::world();
        let (x, y) = self.zones.get(&world).map_or((0.0, 0.0), |z| z.entry);
        let hero = Hero::new(id, definition, &self.content, name, x, y, self.constants.heroes.radius);
        self.push_object(&world, FieldObject::Hero(hero));
        Some(id)
    }

    pub fn spawn_enemy(
        &mut self,
        zone: &ZoneId,
        kind: &EnemyTypeId,
        level: u32,
        x: f64,
        y: f64,
        spawner: Option<ObjectId>,
    ) -> Option<ObjectId> {
        let Some(definition) = self.content.enemies.get(kind) else {
            error!(enemy = %kind, "missing enemy definition");
            return None;
        };
        let id = self.ids.allocate();
        let enemy = Enemy::new(id, definition, &self.content, level, x, y, spawner);
        self.push_object(zone, FieldObject::Enemy(enemy));
        Some(id)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn spawn_ally(
        &mut self,
        zone: &ZoneId,
        kind: &AllyTypeId,
        owner: ObjectId,
        level: u32,
        x: f64,
        y: f64,
        lifetime: f64,
    ) -> Option<ObjectId> {
        let Some(definition) = self.content.allies.get(kind) else {
            error!(ally = %kind, "missing ally definition");
            return None;
        };
        let id = self.ids.allocate();
        let lifetime = (lifetime > 0.0).then_some(lifetime);
        let ally = Ally::new(id, definition, &self.content, level, Some(owner), x, y, lifetime);
        self.push_object(zone, FieldObject::Ally(ally));
        Some(id)
    }

    /// Put a spawner of the next level around the nexus
    pub fn spawn_world_spawner(&mut self) -> ObjectId {
        let level = self.world.next_spawner_level;
        self.world.next_spawner_level += 1;

        let angle = TAU * (level as f64 * 0.381_966);
        let distance = self.constants.spawners.distance;
        let x = self.constants.nexus.x + angle.cos() * distance;
        let y = self.constants.nexus.y + angle.sin() * distance;
        let enemy = self.pick_spawner_enemy(level);

        let spawner = Spawner::new(self.allocate_id(), enemy, level, x, y, &self.constants);
        let id = spawner.id;
        self.push_object(&ZoneId::world(), FieldObject::Spawner(spawner));
        info!(spawner = %id, level, "spawner created");
        id
    }

    fn pick_spawner_enemy(&self, level: u32) -> EnemyTypeId {
        let kinds: Vec<&EnemyTypeId> = self.content.enemies.keys().collect();
        if kinds.is_empty() {
            error!("no enemy definitions for spawners");
            return EnemyTypeId::from("goblin");
        }
        kinds[(level as usize - 1) % kinds.len()].clone()
    }

    /// Zone currently holding `id`
    pub fn zone_of(&self, id: ObjectId) -> Option<&ZoneId> {
        self.zones
            .iter()
            .find(|(_, zone)| zone.contains(id))
            .map(|(zone_id, _)| zone_id)
    }

    pub fn find_object(&self, id: ObjectId) -> Option<(&ZoneId, &FieldObject)> {
        self.zones
            .iter()
            .find_map(|(zone_id, zone)| zone.get(id).map(|o| (zone_id, o)))
    }

    pub fn find_object_mut(&mut self, id: ObjectId) -> Option<&mut FieldObject> {
        self.zones.values_mut().find_map(|zone| zone.get_mut(id))
    }

    pub fn hero(&self, id: ObjectId) -> Option<&Hero> {
        self.find_object(id).and_then(|(_, o)| o.as_hero())
    }

    pub fn hero_mut(&mut self, id: ObjectId) -> Option<&mut Hero> {
        self.find_object_mut(id).and_then(FieldObject::as_hero_mut)
    }

    /// Every hero in every zone, in zone order
    pub fn heroes(&self) -> impl Iterator<Item = &Hero> {
        self.zones
            .values()
            .flat_map(|zone| zone.objects.iter())
            .filter_map(FieldObject::as_hero)
    }

    pub fn hero_ids(&self) -> Vec<ObjectId> {
        self.heroes().map(Hero::id).collect()
    }

    /// Move a hero into `zone` at its entry point, creating the zone if
    /// needed; the hero's commands do not survive the trip
    pub fn move_hero(&mut self, hero: ObjectId, zone: &ZoneId) -> bool {
        if !self.ensure_zone(zone) {
            error!(%zone, "hero sent to a zone without a definition");
            return false;
        }
        if self.hero(hero).is_none() {
            error!(%hero, "moved object is not a hero");
            return false;
        }
        let Some(from) = self.zone_of(hero).cloned() else {
            return false;
        };
        let Some(FieldObject::Hero(mut moved)) = self.zones.get_mut(&from).and_then(|z| z.remove(hero)) else {
            return false;
        };
        let Some(target) = self.zones.get_mut(zone) else {
            return false;
        };
        moved.core.reset_commands();
        moved.core.circle.x = target.entry.0;
        moved.core.circle.y = target.entry.1;
        target.objects.push(FieldObject::Hero(moved));
        debug!(%hero, from = %from, to = %zone, "hero changed zone");
        true
    }

    /// Drop essence at a point of a zone
    pub fn drop_loot(&mut self, zone: &ZoneId, x: f64, y: f64, essence: f64) {
        let loot = Loot {
            id: self.allocate_id(),
            circle: Circle::new(x, y, self.constants.combat.loot_radius),
            essence,
            lifetime: self.constants.combat.loot_lifetime,
        };
        self.push_object(zone, FieldObject::Loot(loot));
    }

    /// Resource left in overworld nodes of `kind`
    pub fn resource_node_remaining(&self, kind: crate::types::ResourceKind) -> u32 {
        self.zones
            .values()
            .flat_map(|zone| zone.objects.iter())
            .filter_map(|o| match o {
                FieldObject::Structure(Structure {
                    kind: StructureKind::ResourceNode { resource, remaining },
                    ..
                }) if *resource == kind => Some(*remaining),
                _ => None,
            })
            .sum()
    }

    /// Draw up to `amount` of `kind` from resource nodes; returns the amount
    pub fn draw_from_nodes(&mut self, kind: crate::types::ResourceKind, amount: u32) -> u32 {
        let mut drawn = 0;
        for object in self.zones.values_mut().flat_map(|zone| zone.objects.iter_mut()) {
            if drawn >= amount {
                break;
            }
            if let FieldObject::Structure(Structure {
                kind: StructureKind::ResourceNode { resource, remaining },
                ..
            }) = object
            {
                if *resource == kind && *remaining > 0 {
                    let take = (*remaining).min(amount - drawn);
                    *remaining -= take;
                    drawn += take;
                }
            }
        }
        drawn
    }
}
