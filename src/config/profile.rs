use std::{any::type_name, sync::Arc};

use super::{type_map::TypeMapEntry, DataRecordMemberResolver, MemberResolver, TypeMap};
use crate::{naming::NamingConvention, shape::Mapped};

/// A named group of type maps with its own conventions and member resolvers.
pub trait Profile {
    fn name(&self) -> &str {
        type_name::<Self>()
    }

    fn configure(&self, profile: &mut ProfileExpression);
}

/// What a [`Profile`] registers.
#[derive(Debug, Default)]
pub struct ProfileExpression {
    pub(crate) maps: Vec<TypeMapEntry>,
    pub(crate) resolvers: Vec<Arc<dyn MemberResolver>>,
    pub(crate) source_naming: Option<NamingConvention>,
    pub(crate) destination_naming: Option<NamingConvention>,
}

impl ProfileExpression {
    pub fn create_map<T: Mapped>(&mut self, map: TypeMap<T>) -> &mut Self {
        self.maps.push(map.into_entry());
        self
    }

    /// Resolves the members of this profile's maps from record fields.
    pub fn add_data_record_member(&mut self) -> &mut Self {
        self.add_member_resolver(DataRecordMemberResolver)
    }

    pub fn add_member_resolver(&mut self, resolver: impl MemberResolver + 'static) -> &mut Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn source_naming(&mut self, convention: NamingConvention) -> &mut Self {
        self.source_naming = Some(convention);
        self
    }

    pub fn destination_naming(&mut self, convention: NamingConvention) -> &mut Self {
        self.destination_naming = Some(convention);
        self
    }
}

/// Wraps a profile so that its maps resolve members from record fields.
#[derive(Debug, Default, Clone)]
pub struct DataReaderProfile<P>(pub P);

impl<P: Profile> Profile for DataReaderProfile<P> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn configure(&self, profile: &mut ProfileExpression) {
        profile.add_data_record_member();
        self.0.configure(profile);
    }
}
