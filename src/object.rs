//! Module for handling and retrieving complete NRRD objects, along with the
//! options for reading them.

use crate::error::Result;
use crate::field::{FieldMap, FieldType};
use crate::header::{self, NrrdHeader};
use crate::typedef::IndexOrder;
use crate::util::resolve_data_file;
use crate::volume::codec::DataLayout;
use crate::volume::{DataElement, InMemNrrdVolume, IntoNdArray, NrrdVolume};
use log::debug;
use ndarray::{Array, IxDyn};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

/// What to do when a header declares the same field twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateFieldPolicy {
    /// Fail with `NrrdError::DuplicateField`.
    Reject,
    /// Log a warning and keep the first declaration.
    WarnKeepFirst,
    /// Log a warning and keep the last declaration.
    WarnOverwrite,
}

impl Default for DuplicateFieldPolicy {
    fn default() -> Self {
        DuplicateFieldPolicy::Reject
    }
}

/// How the `space directions` field is represented once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceDirectionsRepr {
    /// A double matrix where `none` rows are filled with NaN.
    Matrix,
    /// A list of optional vectors where `none` rows are absent.
    VectorList,
}

impl Default for SpaceDirectionsRepr {
    fn default() -> Self {
        SpaceDirectionsRepr::Matrix
    }
}

/// Options and flags which can be used to configure how a NRRD file is
/// read.
///
/// # Example
///
/// ```no_run
/// use nrrd::{FieldType, IntoNdArray, NrrdObject, ReaderOptions};
/// # use nrrd::Result;
///
/// # fn run() -> Result<()> {
/// let obj = ReaderOptions::new()
///     .custom_field("my matrix", FieldType::DoubleMatrix)
///     .read_file("volume.nrrd")?;
/// let data = obj.into_volume().into_ndarray::<f32>()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReaderOptions {
    pub(crate) custom_fields: FieldMap,
    pub(crate) duplicate_fields: DuplicateFieldPolicy,
    pub(crate) space_directions: SpaceDirectionsRepr,
    pub(crate) index_order: IndexOrder,
}

impl ReaderOptions {
    /// Creates a blank new set of options ready for configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the types of custom fields. Fields in the map are parsed as the
    /// given type, whether written as `field: value` or `field:=value`.
    /// The types of fields known to the format cannot be changed.
    pub fn custom_fields(mut self, custom_fields: FieldMap) -> Self {
        self.custom_fields = custom_fields;
        self
    }

    /// Set the type of a single custom field.
    pub fn custom_field<S: Into<String>>(mut self, field: S, field_type: FieldType) -> Self {
        let _ = self.custom_fields.insert(field.into(), field_type);
        self
    }

    /// Set what to do with fields declared more than once.
    pub fn duplicate_fields(mut self, policy: DuplicateFieldPolicy) -> Self {
        self.duplicate_fields = policy;
        self
    }

    /// Set how to represent the `space directions` field.
    pub fn space_directions(mut self, repr: SpaceDirectionsRepr) -> Self {
        self.space_directions = repr;
        self
    }

    /// Set the axis order of arrays produced by
    /// [`read_array`](#method.read_array). With `IndexOrder::C` the first
    /// array axis is the slowest varying one.
    pub fn index_order(mut self, order: IndexOrder) -> Self {
        self.index_order = order;
        self
    }

    /// Read a NRRD file straight into an array of samples, returned along
    /// with its header.
    ///
    /// # Errors
    ///
    /// - `NrrdError::ElementTypeMismatch` if `T` is not the element type
    ///   declared by the header.
    pub fn read_array<T, P>(&self, path: P) -> Result<(Array<T, IxDyn>, NrrdHeader)>
    where
        T: DataElement,
        P: AsRef<Path>,
    {
        let (header, volume) = self.read_file(path)?.into_parts();
        let data = volume.into_ndarray_with_order(self.index_order)?;
        Ok((data, header))
    }

    /// Retrieve the full contents of a NRRD object. The given file system
    /// path is used as reference: attached data is read from the same
    /// file, while a relative detached `data file` is looked up next to
    /// the header.
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<InMemNrrdObject> {
        let path = path.as_ref();
        let mut file = BufReader::new(File::open(path)?);
        let (header, _) = header::read_header(&mut file, self)?;
        let volume = self.read_data(&header, file, Some(path))?;
        Ok(InMemNrrdObject { header, volume })
    }

    /// Retrieve only the header of a NRRD file.
    pub fn read_header_file<P: AsRef<Path>>(&self, path: P) -> Result<NrrdHeader> {
        header::read_header_file(path, self)
    }

    /// Read a NRRD header from a text source, consuming it up to and
    /// including the blank line which ends the header.
    pub fn read_header<R: BufRead>(&self, source: R) -> Result<NrrdHeader> {
        header::read_header(source, self).map(|(h, _)| h)
    }

    /// Read a NRRD header from a seekable source, which is left positioned
    /// at the start of the data section.
    pub fn read_header_seek<R: Read + Seek>(&self, source: &mut R) -> Result<NrrdHeader> {
        header::read_header_seek(source, self).map(|(h, _)| h)
    }

    /// Retrieve a NRRD object from a stream of data.
    ///
    /// # Errors
    ///
    /// - `NrrdError::MissingHeaderPath` if the header names a relative
    /// detached data file, which cannot be located without a file path.
    pub fn read_reader<R: BufRead>(&self, mut source: R) -> Result<InMemNrrdObject> {
        let (header, _) = header::read_header(&mut source, self)?;
        let volume = self.read_data(&header, source, None)?;
        Ok(InMemNrrdObject { header, volume })
    }

    /// Read the data described by a header which was already read.
    ///
    /// If the header names a detached data file, it is opened, resolved
    /// relative to `header_path` when relative, and `source` is not used.
    /// Otherwise the data is read from `source`, which must be positioned
    /// right after the header.
    pub fn read_data<R: BufRead>(
        &self,
        header: &NrrdHeader,
        source: R,
        header_path: Option<&Path>,
    ) -> Result<InMemNrrdVolume> {
        let layout = DataLayout::from_header(header)?;
        match &layout.data_file {
            Some(data_file) => {
                let path = resolve_data_file(data_file, header_path)?;
                debug!("Reading detached data file {}", path.display());
                let file = BufReader::new(File::open(&path)?);
                InMemNrrdVolume::from_layout(file, &layout)
            }
            None => InMemNrrdVolume::from_layout(source, &layout),
        }
    }
}

/// Trait type for all possible implementations of
/// owning NRRD objects. Objects contain a NRRD header
/// and a volume.
pub trait NrrdObject {
    /// The concrete type of the volume.
    type Volume: NrrdVolume;

    /// Obtain a reference to the NRRD header.
    fn header(&self) -> &NrrdHeader;

    /// Obtain a mutable reference to the NRRD header.
    fn header_mut(&mut self) -> &mut NrrdHeader;

    /// Obtain a reference to the object's volume.
    fn volume(&self) -> &Self::Volume;

    /// Move the volume out of the object, discarding the
    /// header.
    fn into_volume(self) -> Self::Volume;
}

/// Data type for a NRRD object that is fully contained in memory.
#[derive(Debug, PartialEq, Clone)]
pub struct InMemNrrdObject {
    header: NrrdHeader,
    volume: InMemNrrdVolume,
}

impl InMemNrrdObject {
    /// Retrieve the full contents of a NRRD object with default options.
    /// See [`ReaderOptions::read_file`](struct.ReaderOptions.html#method.read_file).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nrrd::InMemNrrdObject;
    /// # use nrrd::Result;
    ///
    /// # fn run() -> Result<()> {
    /// let obj = InMemNrrdObject::from_file("volume.nhdr")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<InMemNrrdObject> {
        ReaderOptions::new().read_file(path)
    }

    /// Retrieve a NRRD object from a stream of data with default options.
    pub fn from_reader<R: BufRead>(source: R) -> Result<InMemNrrdObject> {
        ReaderOptions::new().read_reader(source)
    }

    /// Split the object into its header and volume.
    pub fn into_parts(self) -> (NrrdHeader, InMemNrrdVolume) {
        (self.header, self.volume)
    }
}

impl NrrdObject for InMemNrrdObject {
    type Volume = InMemNrrdVolume;

    fn header(&self) -> &NrrdHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut NrrdHeader {
        &mut self.header
    }

    fn volume(&self) -> &Self::Volume {
        &self.volume
    }

    fn into_volume(self) -> Self::Volume {
        self.volume
    }
}
