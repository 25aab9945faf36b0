//! Mapping configuration: type maps, member resolvers, conventions and the materialization mode.

mod profile;
mod resolver;
mod type_map;

use std::{
    any::{type_name, TypeId},
    collections::{HashMap, HashSet},
    sync::Arc,
};

pub use profile::{DataReaderProfile, Profile, ProfileExpression};
pub use resolver::{DataRecordMemberResolver, MemberResolver};
pub use type_map::TypeMap;
use type_map::TypeMapEntry;

use crate::{
    collection::MaterializeMode,
    error::{MapError, TypePair},
    naming::NamingConvention,
    observability::log_debug,
    plan::{ItemPlan, PlanCache, PlanCompiler, Projection, SourceType},
    shape::Mapped,
};

/// A built mapping configuration.
///
/// Owns the plan cache: plans compiled for this configuration live exactly as long as it does.
/// Share it between mappers and threads through an `Arc`.
#[derive(Debug)]
pub struct MapperConfiguration {
    type_maps: HashMap<TypeId, TypeMapEntry>,
    mode: MaterializeMode,
    reader_mapping: bool,
    cache: PlanCache,
}

impl MapperConfiguration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn mode(&self) -> MaterializeMode {
        self.mode
    }

    /// Whether `add_data_reader_mapping` was called, enabling whole-reader mapping.
    pub fn reader_mapping_enabled(&self) -> bool {
        self.reader_mapping
    }

    pub fn cache(&self) -> &PlanCache {
        &self.cache
    }

    pub fn has_type_map<T: Mapped>(&self) -> bool {
        self.type_maps.contains_key(&TypeId::of::<T>())
    }

    /// Plan building a `T` from one row of `source`.
    ///
    /// The plan is compiled on first use and served from the cache afterwards.
    pub fn item_plan<T: Mapped>(&self, source: &SourceType) -> Result<ItemPlan<T>, MapError> {
        let entry = self
            .type_maps
            .get(&TypeId::of::<T>())
            .ok_or_else(|| {
                MapError::TypeMapNotFound(TypePair {
                    source: source.name(),
                    destination: type_name::<T>(),
                    destination_id: TypeId::of::<T>(),
                })
            })?;
        let resolver = match entry.resolvers.iter().find(|r| r.is_match(source)) {
            Some(resolver) => resolver,
            None if entry.resolvers.is_empty() => return Err(MapError::NoMemberResolver),
            None => {
                return Err(MapError::UnsupportedSource {
                    source_type: source.name(),
                })
            }
        };
        let compiler = PlanCompiler::new(&self.cache, entry.naming);
        let plan = compiler.compile_root(source, &entry.shape, &entry.projections, &**resolver)?;
        Ok(ItemPlan::new(plan))
    }

    /// Checks every type map: record member resolution is registered, the destination is
    /// constructible, and every projection targets a writable member of the same type.
    pub fn assert_configuration_is_valid(&self) -> Result<(), MapError> {
        let mut problems = Vec::new();
        let mut entries: Vec<&TypeMapEntry> = self.type_maps.values().collect();
        entries.sort_by_key(|entry| entry.shape.type_name());

        for entry in entries {
            let destination = entry.shape.type_name();
            if entry.resolvers.is_empty() {
                problems.push(format!("{destination}: no member resolver registered"));
            }
            if !entry.shape.classify().is_nested() {
                problems.push(format!("{destination}: not constructible"));
                continue;
            }
            let members: HashMap<&'static str, _> = entry
                .shape
                .members()
                .into_iter()
                .map(|member| (member.name(), member.shape()))
                .collect();
            let mut names: Vec<_> = entry.projections.keys().collect();
            names.sort();
            for name in names {
                let projection = &entry.projections[name];
                match members.get(name) {
                    None => problems.push(format!("{destination}: no writable member {name}")),
                    Some(member) if member.type_id() != projection.value_type() => {
                        problems.push(format!(
                            "{destination}.{name}: projection yields {}, member is {}",
                            projection.value_type_name(),
                            member.type_name()
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(MapError::InvalidConfiguration(problems.join("; ")))
        }
    }
}

/// Builder of a [`MapperConfiguration`].
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    maps: Vec<TypeMapEntry>,
    profiles: Vec<(String, ProfileExpression)>,
    resolvers: Vec<Arc<dyn MemberResolver>>,
    mode: MaterializeMode,
    reader_mapping: bool,
    source_naming: Option<NamingConvention>,
    destination_naming: Option<NamingConvention>,
}

impl ConfigurationBuilder {
    /// Enables mapping of readers and record members.
    ///
    /// With `yield_return` readers are mapped lazily, one row per demand; otherwise they are
    /// drained into a list.
    pub fn add_data_reader_mapping(mut self, yield_return: bool) -> Self {
        if !self.reader_mapping {
            self.resolvers.push(Arc::new(DataRecordMemberResolver));
        }
        ConfigurationBuilder {
            mode: MaterializeMode::from_yield_return(yield_return),
            reader_mapping: true,
            ..self
        }
    }

    pub fn add_member_resolver(mut self, resolver: impl MemberResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn create_map<T: Mapped>(mut self, map: TypeMap<T>) -> Self {
        self.maps.push(map.into_entry());
        self
    }

    pub fn source_naming(self, source_naming: NamingConvention) -> Self {
        ConfigurationBuilder {
            source_naming: Some(source_naming),
            ..self
        }
    }

    pub fn destination_naming(self, destination_naming: NamingConvention) -> Self {
        ConfigurationBuilder {
            destination_naming: Some(destination_naming),
            ..self
        }
    }

    pub fn add_profile(mut self, profile: impl Profile) -> Self {
        let mut expression = ProfileExpression::default();
        profile.configure(&mut expression);
        self.profiles.push((profile.name().to_owned(), expression));
        self
    }

    /// Enables reader mapping and adds `profile` with record member resolution.
    pub fn add_data_reader_profile<P: Profile>(self, profile: P) -> Self {
        self.add_data_reader_mapping(false)
            .add_profile(DataReaderProfile(profile))
    }

    pub fn build(self) -> Result<MapperConfiguration, MapError> {
        let mut entries = Vec::new();
        for mut entry in self.maps {
            entry.resolvers = self.resolvers.clone();
            entries.push(entry);
        }
        for (name, profile) in self.profiles {
            for mut entry in profile.maps {
                entry.inherit_naming(profile.source_naming, profile.destination_naming);
                entry.resolvers = profile.resolvers.clone();
                log_debug!(
                    event = "profile_map_registered",
                    profile = %name,
                    destination = entry.shape.type_name(),
                );
                entries.push(entry);
            }
        }

        let mut type_maps = HashMap::with_capacity(entries.len());
        for mut entry in entries {
            entry.inherit_naming(self.source_naming, self.destination_naming);
            entry.finish_naming();
            let destination = entry.shape.type_name();
            if type_maps.insert(entry.shape.type_id(), entry).is_some() {
                return Err(MapError::InvalidConfiguration(format!(
                    "duplicate type map for {destination}"
                )));
            }
        }
        include_bases(&mut type_maps)?;

        Ok(MapperConfiguration {
            type_maps,
            mode: self.mode,
            reader_mapping: self.reader_mapping,
            cache: PlanCache::new(),
        })
    }
}

/// Copies the projections of included base maps into their derived maps, for members the
/// derived type shares with the base and does not project itself. Bases are followed
/// transitively, nearest first.
fn include_bases(type_maps: &mut HashMap<TypeId, TypeMapEntry>) -> Result<(), MapError> {
    let mut inherited: Vec<(TypeId, Vec<(&'static str, Projection)>)> = Vec::new();

    for (type_id, entry) in type_maps.iter() {
        if entry.bases.is_empty() {
            continue;
        }
        let members: HashSet<&'static str> =
            entry.shape.members().iter().map(|m| m.name()).collect();
        let mut seen = HashSet::from([*type_id]);
        let mut pending: Vec<(TypeId, &'static str)> = entry.bases.clone();
        let mut projections: Vec<(&'static str, Projection)> = Vec::new();

        while !pending.is_empty() {
            let (base_id, base_name) = pending.remove(0);
            if !seen.insert(base_id) {
                continue;
            }
            let base = type_maps.get(&base_id).ok_or_else(|| {
                MapError::InvalidConfiguration(format!(
                    "{} includes {base_name}, which has no type map",
                    entry.shape.type_name()
                ))
            })?;
            let mut names: Vec<_> = base.projections.keys().copied().collect();
            names.sort();
            for name in names {
                let shadowed = entry.projections.contains_key(name)
                    || projections.iter().any(|(taken, _)| *taken == name);
                if members.contains(name) && !shadowed {
                    projections.push((name, base.projections[name].clone()));
                }
            }
            pending.extend(base.bases.iter().copied());
        }
        inherited.push((*type_id, projections));
    }

    for (type_id, projections) in inherited {
        if let Some(entry) = type_maps.get_mut(&type_id) {
            entry.projections.extend(projections);
        }
    }
    Ok(())
}
