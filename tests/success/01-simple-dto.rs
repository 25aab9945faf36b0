use rowmap::{Mapped, Mapper, MapperConfiguration, MemoryTable, TypeMap, Value};

#[derive(Debug, Default, Mapped)]
#[mapped(rename_all = "camelCase")]
pub struct Music {
    pub id: u32,
    pub name: String,
    pub url: Option<String>,
    #[mapped(rename = "favorite")]
    pub is_favorite: bool,
    #[mapped(skip)]
    pub play_count: u64,
    pub album: Option<Album>,
    pub genre: Genre,
}

#[derive(Debug, Default, Mapped)]
pub struct Album {
    pub title: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Mapped)]
pub enum Genre {
    #[default]
    Unknown = 0,
    Jazz = 1,
    #[mapped(rename = "rock")]
    Rock = 2,
}

fn main() {
    let config = MapperConfiguration::builder()
        .add_data_reader_mapping(false)
        .create_map(TypeMap::<Music>::new())
        .build()
        .unwrap();
    let mapper = Mapper::new(config);

    let table = MemoryTable::new(["id", "name", "favorite", "album.title", "genre"])
        .with_row([
            Value::UInt32(1),
            Value::from("So What"),
            Value::Boolean(true),
            Value::from("Kind of Blue"),
            Value::Int32(1),
        ])
        .unwrap();
    let music = mapper
        .map_reader::<Music, _>(&mut table.reader())
        .unwrap()
        .into_vec()
        .unwrap();

    assert_eq!(music[0].id, 1);
    assert!(music[0].is_favorite);
    assert_eq!(music[0].album.as_ref().map(|album| album.title.as_str()), Some("Kind of Blue"));
    assert_eq!(music[0].genre, Genre::Jazz);
}
